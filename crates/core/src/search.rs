//! Character gallery filtering.

use crate::model::{BibleCharacter, Testament};

/// Narrowing applied to the character gallery. An empty filter keeps
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    pub term: Option<String>,
    pub testament: Option<Testament>,
}

impl CharacterFilter {
    #[must_use]
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            testament: None,
        }
    }

    #[must_use]
    pub fn with_testament(mut self, testament: Testament) -> Self {
        self.testament = Some(testament);
        self
    }

    fn normalized_term(&self) -> Option<String> {
        self.term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    #[must_use]
    pub fn matches(&self, character: &BibleCharacter) -> bool {
        if self
            .testament
            .is_some_and(|t| t != character.testament())
        {
            return false;
        }
        let Some(term) = self.normalized_term() else {
            return true;
        };
        [
            Some(character.name()),
            character.description(),
            character.category(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Keeps the characters accepted by `filter`, sorted by name then id.
#[must_use]
pub fn filter_characters(
    characters: impl IntoIterator<Item = BibleCharacter>,
    filter: &CharacterFilter,
) -> Vec<BibleCharacter> {
    let mut kept: Vec<BibleCharacter> = characters
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();
    kept.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.id().cmp(&b.id()))
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharacterId, CharacterProfile};
    use crate::time::fixed_now;

    fn character(id: u128, name: &str, testament: Testament, category: &str) -> BibleCharacter {
        BibleCharacter::new(
            CharacterId::from_u128(id),
            name,
            testament,
            CharacterProfile {
                category: Some(category.into()),
                description: Some(format!("{name} appears in scripture")),
                ..CharacterProfile::default()
            },
            fixed_now(),
        )
        .unwrap()
    }

    fn gallery() -> Vec<BibleCharacter> {
        vec![
            character(1, "Moses", Testament::Old, "Prophet"),
            character(2, "Peter", Testament::New, "Apostle"),
            character(3, "abraham", Testament::Old, "Patriarch"),
            character(4, "Paul", Testament::New, "Apostle"),
        ]
    }

    fn names(characters: &[BibleCharacter]) -> Vec<&str> {
        characters.iter().map(BibleCharacter::name).collect()
    }

    #[test]
    fn empty_filter_keeps_all_sorted_by_name() {
        let kept = filter_characters(gallery(), &CharacterFilter::default());
        assert_eq!(names(&kept), ["abraham", "Moses", "Paul", "Peter"]);
    }

    #[test]
    fn term_matches_category_case_insensitively() {
        let kept = filter_characters(gallery(), &CharacterFilter::term("  APOSTLE "));
        assert_eq!(names(&kept), ["Paul", "Peter"]);
    }

    #[test]
    fn testament_narrows_term_results() {
        let filter = CharacterFilter::term("p").with_testament(Testament::Old);
        let kept = filter_characters(gallery(), &filter);
        assert_eq!(names(&kept), ["abraham", "Moses"]);
    }

    #[test]
    fn blank_term_is_ignored() {
        let filter = CharacterFilter::term("   ").with_testament(Testament::New);
        let kept = filter_characters(gallery(), &filter);
        assert_eq!(names(&kept), ["Paul", "Peter"]);
    }
}
