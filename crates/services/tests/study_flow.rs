use services::{AppServices, CatalogConfig, CategoryDraft, Clock, ContentDraft, TopicDraft};
use storage::repository::Storage;
use study_core::model::{ContentKind, ParentRef, Role, UserId};
use study_core::progress::Completion;
use study_core::time::fixed_now;

#[tokio::test]
async fn sqlite_study_flow_rolls_up_completions() {
    let storage = Storage::sqlite("sqlite:file:memdb_study_flow?mode=memory&cache=shared")
        .await
        .expect("sqlite storage");
    let admin_id = UserId::from_u128(1);
    let reader = UserId::from_u128(2);
    storage.roles.grant_role(admin_id, Role::Admin).await.unwrap();

    let app = AppServices::from_storage(&storage, Clock::Fixed(fixed_now()), CatalogConfig::default());
    let admin = app.admin();

    let topic = admin
        .create_topic(
            admin_id,
            TopicDraft {
                title: "Old Testament".into(),
                display_order: 1,
                is_active: true,
                ..TopicDraft::default()
            },
        )
        .await
        .unwrap();
    let genesis = admin
        .create_category(
            admin_id,
            CategoryDraft {
                topic_id: topic.id(),
                title: "Genesis".into(),
                description: None,
                image_url: None,
                display_order: 1,
            },
        )
        .await
        .unwrap();
    let creation = admin
        .create_content(
            admin_id,
            ContentDraft {
                topic_id: topic.id(),
                kind: ContentKind::Subcategory,
                parent: ParentRef::Category(genesis.id()),
                title: "Creation".into(),
                description: None,
                display_order: 1,
                body: None,
                bible_references: Vec::new(),
            },
        )
        .await
        .unwrap();

    let mut lessons = Vec::new();
    for (title, parent, order) in [
        ("Six days", ParentRef::Content(creation.id()), 1),
        ("The flood", ParentRef::Category(genesis.id()), 2),
    ] {
        let lesson = admin
            .create_content(
                admin_id,
                ContentDraft {
                    topic_id: topic.id(),
                    kind: ContentKind::Lesson,
                    parent,
                    title: title.into(),
                    description: None,
                    display_order: order,
                    body: Some("Read and reflect.".into()),
                    bible_references: vec!["Genesis 1".into()],
                },
            )
            .await
            .unwrap();
        lessons.push(lesson);
    }

    let catalog = app.catalog();
    let progress = app.progress();
    progress
        .record_completion(reader, topic.id(), lessons[0].id(), None)
        .await
        .unwrap();

    let view = catalog.user_progress(topic.id(), reader).await.unwrap();
    assert_eq!(view.progress.completion, Completion::new(1, 2));
    assert!((view.progress.completion.percentage() - 50.0).abs() < f64::EPSILON);
    assert_eq!(
        view.progress.next_lesson().map(|n| n.id()),
        Some(lessons[1].id())
    );
    assert!(view.diagnostics.is_empty());

    progress
        .record_completion(reader, topic.id(), lessons[1].id(), Some("done".into()))
        .await
        .unwrap();
    let view = catalog.user_progress(topic.id(), reader).await.unwrap();
    let genesis_progress = &view.progress.categories[0];
    assert_eq!(genesis_progress.completion, Completion::new(2, 2));
    assert!(genesis_progress.completion.is_complete());
    assert_eq!(view.progress.last_completed_at, Some(fixed_now()));

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["progress"]["completion"]["total"], 2);

    let overview = progress.overview(reader).await.unwrap();
    assert_eq!(overview.topics_started, 1);
    assert_eq!(overview.topics_completed, 1);
    assert_eq!(overview.lessons, Completion::new(2, 2));

    let topics = catalog.list_topics().await.unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].title(), "Old Testament");
}
