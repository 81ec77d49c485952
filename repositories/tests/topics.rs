//! These run against a real postgres started through docker, so they are ignored by default.
//! Run them with `cargo test -p repositories -- --ignored`.
use futures::future::join_all;
use repositories::postgres::initializer::RepoCreator;
use repositories::postgres::topics::TopicRepo;
use repositories::postgres::{ConnectionDetails, PoolSettings};
use rstest::{fixture, rstest};
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};
use topics_core::TopicRepository;
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::{Counter, Keywords, TopicDraft, TopicFields, TopicId, TopicUpdate};

struct TestRuntime {
    _container: ContainerAsync<Postgres>,
    repo: TopicRepo,
}

fn fields(title: &str, category: &str, content: &str) -> TopicFields {
    TopicDraft {
        title: Some(title.into()),
        category: Some(category.into()),
        keywords: Some(Keywords::List(vec!["a".into(), "b".into()])),
        content: Some(content.into()),
        author: None,
    }
    .into()
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn init_schema_is_idempotent(#[future] runtime: TestRuntime) {
    let runtime = runtime.await;

    runtime.repo.init_schema().await.unwrap();
    runtime.repo.init_schema().await.unwrap();
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn create_then_get_returns_transformed_topic(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;

    let id = repo
        .create(fields("X", "General", "<b>Hi</b> there"))
        .await
        .unwrap();
    let topic = repo.get(id).await.unwrap().expect("created topic exists");

    assert_eq!("X", topic.title);
    assert_eq!(Some("General"), topic.category.as_deref());
    assert_eq!(vec!["a", "b"], topic.keywords);
    assert_eq!("Hi there...", topic.preview);
    assert_eq!("Anonymous", topic.author);
    assert_eq!(0, topic.views);
    assert_eq!(0, topic.helpful);
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn get_missing_returns_none(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;

    assert!(repo.get(TopicId::new(4242)).await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn create_without_title_is_a_storage_error(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;

    let result = repo.create(TopicDraft::default().into()).await;

    let report = result.expect_err("title is required by the schema");
    assert!(report.current_context().message().contains("title"));
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn list_filters_and_limits_newest_first(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;

    let first = repo.create(fields("VPN setup", "Network", "connect")).await.unwrap();
    let second = repo.create(fields("Printer", "Hardware", "toner")).await.unwrap();
    let third = repo.create(fields("Wifi", "Network", "use the vpn")).await.unwrap();

    let all = repo.list(TopicListCriteria::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|t| t.id).collect();
    assert_eq!(vec![third, second, first], ids);

    let limited = repo
        .list(TopicListCriteria::new(None, None, Some("2".into())))
        .await
        .unwrap();
    assert_eq!(vec![third, second], limited.iter().map(|t| t.id).collect::<Vec<_>>());

    let searched = repo
        .list(TopicListCriteria::new(Some("VPN".into()), Some("Network".into()), None))
        .await
        .unwrap();
    assert_eq!(vec![third, first], searched.iter().map(|t| t.id).collect::<Vec<_>>());

    let all_category = repo
        .list(TopicListCriteria::new(None, Some("all".into()), None))
        .await
        .unwrap();
    assert_eq!(all, all_category);
}

#[rstest]
#[case::negative("-1", "LIMIT must not be negative")]
#[case::not_a_number("ten", "invalid input syntax for type bigint")]
#[tokio::test]
#[ignore = "requires docker"]
async fn invalid_limit_is_a_storage_error(
    #[future] runtime: TestRuntime,
    #[case] limit: &str,
    #[case] message: &str,
) {
    let repo = runtime.await.repo;

    let result = repo
        .list(TopicListCriteria::new(None, None, Some(limit.into())))
        .await;

    let report = result.expect_err("postgres rejects the limit");
    assert!(
        report.current_context().message().contains(message),
        "{report:?}"
    );
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn concurrent_increments_are_not_lost(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;
    let id = repo.create(fields("Counted", "General", "")).await.unwrap();

    let views = (0..25).map(|_| repo.update(id, TopicUpdate::Increment(Counter::Views)));
    let helpful = (0..5).map(|_| repo.update(id, TopicUpdate::Increment(Counter::Helpful)));
    for touched in join_all(views).await.into_iter().chain(join_all(helpful).await) {
        assert_eq!(1, touched.unwrap());
    }

    let topic = repo.get(id).await.unwrap().unwrap();
    assert_eq!(25, topic.views);
    assert_eq!(5, topic.helpful);
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn replace_overwrites_every_field(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;
    let id = repo.create(fields("Old", "General", "old body")).await.unwrap();

    let touched = repo
        .update(
            id,
            TopicUpdate::Replace(
                TopicDraft {
                    title: Some("New".into()),
                    ..Default::default()
                }
                .into(),
            ),
        )
        .await
        .unwrap();
    assert_eq!(1, touched);

    let topic = repo.get(id).await.unwrap().unwrap();
    assert_eq!("New", topic.title);
    assert_eq!(None, topic.category);
    assert!(topic.keywords.is_empty());
    assert_eq!(None, topic.content);
    assert_eq!("", topic.preview);
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn update_and_delete_missing_touch_nothing(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;
    let missing = TopicId::new(999);

    assert_eq!(
        0,
        repo.update(missing, TopicUpdate::Increment(Counter::Views))
            .await
            .unwrap()
    );
    assert_eq!(0, repo.delete(missing).await.unwrap());
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn delete_removes_topic(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;
    let id = repo.create(fields("Gone", "General", "")).await.unwrap();

    assert_eq!(1, repo.delete(id).await.unwrap());
    assert!(repo.get(id).await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn category_counts_are_largest_first(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;
    for (title, category) in [("a", "Network"), ("b", "Hardware"), ("c", "Network")] {
        repo.create(fields(title, category, "")).await.unwrap();
    }

    let counts = repo.category_counts().await.unwrap();

    let counts: Vec<_> = counts
        .into_iter()
        .map(|c| (c.category.unwrap_or_default(), c.count))
        .collect();
    assert_eq!(
        vec![("Network".to_string(), 2), ("Hardware".to_string(), 1)],
        counts
    );
}

#[rstest]
#[tokio::test]
#[ignore = "requires docker"]
async fn closed_pool_fails_requests(#[future] runtime: TestRuntime) {
    let repo = runtime.await.repo;

    repo.close();

    assert!(repo.get(TopicId::new(1)).await.is_err());
}

#[fixture]
async fn runtime() -> TestRuntime {
    let container = Postgres::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let repo = RepoCreator::default()
        .with_pool_settings(PoolSettings::default())
        .create(ConnectionDetails::Url(format!(
            "postgres://postgres:postgres@{host}:{port}/postgres"
        )))
        .unwrap();
    repo.init_schema().await.unwrap();

    TestRuntime {
        _container: container,
        repo,
    }
}
