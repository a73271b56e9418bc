use std::sync::Arc;

use storage::repository::CharacterRepository;
use study_core::model::BibleCharacter;
use study_core::search::{CharacterFilter, filter_characters};

use crate::error::CharacterError;

/// Read access to the character gallery.
#[derive(Clone)]
pub struct CharacterService {
    characters: Arc<dyn CharacterRepository>,
}

impl CharacterService {
    #[must_use]
    pub fn new(characters: Arc<dyn CharacterRepository>) -> Self {
        Self { characters }
    }

    /// Characters accepted by `filter`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `CharacterError::Storage` if repository access fails.
    pub async fn list(
        &self,
        filter: &CharacterFilter,
    ) -> Result<Vec<BibleCharacter>, CharacterError> {
        let all = self.characters.list_characters().await?;
        Ok(filter_characters(all, filter))
    }
}
