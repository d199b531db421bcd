//! 自动装配与作用域解析的集成测试


use common::{disposal_log, init_test_logging, Resource};
use di_abstractions::{ContainerConfig, Dependencies, Injectable};
use di_impl::ServiceRegistry;
use infrastructure_common::{Component, DependencyError, TypeInfo};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_CONNECTION: AtomicUsize = AtomicUsize::new(0);

trait Connection: Component {
    fn id(&self) -> usize;
}

struct PooledConnection {
    id: usize,
}

impl PooledConnection {
    fn open() -> Self {
        Self {
            id: NEXT_CONNECTION.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Component for PooledConnection {}

impl Connection for PooledConnection {
    fn id(&self) -> usize {
        self.id
    }
}

impl Injectable for PooledConnection {
    type Dependencies = ();
    type Error = Infallible;

    fn inject((): ()) -> Result<Self, Self::Error> {
        Ok(Self::open())
    }
}

struct Repo {
    connection: Arc<dyn Connection>,
}

impl Component for Repo {}

impl Injectable for Repo {
    type Dependencies = (Arc<dyn Connection>,);
    type Error = Infallible;

    fn inject((connection,): Self::Dependencies) -> Result<Self, Self::Error> {
        Ok(Self { connection })
    }
}

struct UnitOfWork {
    repo: Arc<Repo>,
    connection: Arc<dyn Connection>,
}

impl Component for UnitOfWork {}

impl Injectable for UnitOfWork {
    type Dependencies = (Arc<Repo>, Arc<dyn Connection>);
    type Error = Infallible;

    fn inject((repo, connection): Self::Dependencies) -> Result<Self, Self::Error> {
        Ok(Self { repo, connection })
    }
}

trait AuditSink: Component {}

struct Auditor {
    sink: Option<Arc<dyn AuditSink>>,
}

impl Component for Auditor {}

impl Injectable for Auditor {
    type Dependencies = (Option<Arc<dyn AuditSink>>,);
    type Error = Infallible;

    fn inject((sink,): Self::Dependencies) -> Result<Self, Self::Error> {
        Ok(Self { sink })
    }
}

fn registry_with_connection() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry
        .register_scoped_as::<dyn Connection, PooledConnection, _>(|c| c as Arc<dyn Connection>)
        .unwrap();
    registry
}

#[test]
fn connection_is_shared_per_scope() {
    init_test_logging();
    let mut registry = ServiceRegistry::new();
    registry
        .register_scoped(|| Ok(Arc::new(PooledConnection::open())))
        .unwrap();

    let scope1 = registry.create_named_scope("scope1").unwrap();
    let scope2 = registry.create_named_scope("scope2").unwrap();

    let first = scope1.get_service::<PooledConnection>().unwrap();
    let second = scope1.get_service::<PooledConnection>().unwrap();
    let other = scope2.get_service::<PooledConnection>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_ne!(first.id, other.id);
}

#[test]
fn repo_without_connection_reports_both_types() {
    init_test_logging();
    let mut registry = ServiceRegistry::new();
    registry.register_scoped_injectable::<Repo>().unwrap();
    let scope = registry.create_scope().unwrap();

    match scope.get_service::<Repo>() {
        Err(DependencyError::UnresolvedDependency {
            dependency,
            requested_by,
        }) => {
            assert_eq!(dependency, std::any::type_name::<dyn Connection>());
            assert_eq!(requested_by, std::any::type_name::<Repo>());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("Repo resolved without a connection"),
    }
    assert_eq!(scope.cached_count(), 0);
}

#[test]
fn repo_from_registry_reports_the_same_failure() {
    init_test_logging();
    let mut registry = ServiceRegistry::new();
    registry.register_scoped_injectable::<Repo>().unwrap();

    let err = registry.get_service::<Repo>().err();

    assert!(matches!(
        err,
        Some(DependencyError::UnresolvedDependency { .. })
    ));
}

#[test]
fn nested_dependencies_are_cached_in_the_resolving_scope() {
    init_test_logging();
    let mut registry = registry_with_connection();
    registry.register_scoped_injectable::<Repo>().unwrap();
    registry.register_scoped_injectable::<UnitOfWork>().unwrap();

    let scope = registry.create_scope().unwrap();
    let work = scope.get_service::<UnitOfWork>().unwrap();

    assert!(Arc::ptr_eq(&work.repo.connection, &work.connection));
    assert!(Arc::ptr_eq(
        &scope.get_service::<Repo>().unwrap(),
        &work.repo
    ));
    assert!(Arc::ptr_eq(
        &scope.get_service::<dyn Connection>().unwrap(),
        &work.connection
    ));
    assert_eq!(scope.cached_count(), 3);

    let other = registry.create_scope().unwrap();
    let other_work = other.get_service::<UnitOfWork>().unwrap();
    assert_ne!(other_work.connection.id(), work.connection.id());
}

#[test]
fn nested_dependencies_from_registry_are_fresh() {
    init_test_logging();
    let mut registry = registry_with_connection();
    registry.register_scoped_injectable::<UnitOfWork>().unwrap();
    registry.register_scoped_injectable::<Repo>().unwrap();

    let work = registry.get_service::<UnitOfWork>().unwrap();

    assert!(!Arc::ptr_eq(&work.repo.connection, &work.connection));
}

#[test]
fn optional_dependency_is_none_when_unregistered() {
    init_test_logging();
    let mut registry = ServiceRegistry::new();
    registry.register_scoped_injectable::<Auditor>().unwrap();
    let scope = registry.create_scope().unwrap();

    let auditor = scope.get_service::<Auditor>().unwrap();

    assert!(auditor.sink.is_none());
    assert_eq!(
        <<Auditor as Injectable>::Dependencies as Dependencies>::dependency_types(),
        vec![TypeInfo::of::<dyn AuditSink>()]
    );
}

#[test]
fn scoped_factory_receives_the_resolving_scope() {
    init_test_logging();

    struct ScopeLabel(Option<String>);
    impl Component for ScopeLabel {}

    let mut registry = ServiceRegistry::new();
    registry
        .register_scoped_with_scope(|scope| {
            Ok(Arc::new(ScopeLabel(scope.map(|s| s.name().to_string()))))
        })
        .unwrap();

    let scope = registry.create_named_scope("session-42").unwrap();

    assert_eq!(
        scope.get_service::<ScopeLabel>().unwrap().0.as_deref(),
        Some("session-42")
    );
    assert_eq!(registry.get_service::<ScopeLabel>().unwrap().0, None);
}

#[test]
fn scope_disposes_only_what_it_created() {
    init_test_logging();
    let log = disposal_log();

    struct SessionResource(Resource);
    impl Component for SessionResource {
        fn as_disposable(&self) -> Option<&dyn infrastructure_common::Disposable> {
            self.0.as_disposable()
        }
    }

    let mut registry = ServiceRegistry::new();
    let shared = Arc::new(Resource::new("shared", &log));
    registry.register_singleton(Arc::clone(&shared)).unwrap();
    let session_log = Arc::clone(&log);
    registry
        .register_scoped(move || {
            Ok(Arc::new(SessionResource(Resource::new(
                "session",
                &session_log,
            ))))
        })
        .unwrap();

    let mut scope = registry.create_scope().unwrap();
    scope.get_service::<Resource>().unwrap();
    let session = scope.get_service::<SessionResource>().unwrap();
    assert_eq!(scope.disposable_count(), 1);

    scope.dispose().unwrap();

    assert_eq!(session.0.dispose_count(), 1);
    assert_eq!(shared.dispose_count(), 0);
    assert_eq!(*log.lock().unwrap(), vec!["session".to_string()]);
}

#[test]
fn scope_dispose_continues_past_a_failing_instance() {
    init_test_logging();
    let log = disposal_log();

    struct First(Resource);
    impl Component for First {
        fn as_disposable(&self) -> Option<&dyn infrastructure_common::Disposable> {
            self.0.as_disposable()
        }
    }

    struct Second(Resource);
    impl Component for Second {
        fn as_disposable(&self) -> Option<&dyn infrastructure_common::Disposable> {
            self.0.as_disposable()
        }
    }

    let mut registry = ServiceRegistry::new();
    let first_log = Arc::clone(&log);
    registry
        .register_scoped(move || Ok(Arc::new(First(Resource::failing("a", &first_log)))))
        .unwrap();
    let second_log = Arc::clone(&log);
    registry
        .register_scoped(move || Ok(Arc::new(Second(Resource::new("b", &second_log)))))
        .unwrap();

    let mut scope = registry.create_scope().unwrap();
    let first = scope.get_service::<First>().unwrap();
    let second = scope.get_service::<Second>().unwrap();

    match scope.dispose() {
        Err(DependencyError::Disposal(disposal)) => {
            assert_eq!(disposal.failed_services(), vec![std::any::type_name::<First>()]);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => panic!("failing disposal was not reported"),
    }
    assert!(scope.is_disposed());
    assert_eq!(scope.cached_count(), 0);
    assert_eq!(*log.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(first.0.dispose_count(), 1);
    assert_eq!(second.0.dispose_count(), 1);
}

#[test]
fn self_referencing_service_hits_depth_limit() {
    init_test_logging();

    struct Recursive {
        _inner: Arc<Recursive>,
    }
    impl Component for Recursive {}
    impl Injectable for Recursive {
        type Dependencies = (Arc<Recursive>,);
        type Error = Infallible;

        fn inject((inner,): Self::Dependencies) -> Result<Self, Self::Error> {
            Ok(Self { _inner: inner })
        }
    }

    let mut registry = ServiceRegistry::with_config(ContainerConfig {
        max_resolution_depth: 8,
        ..ContainerConfig::default()
    });
    registry.register_scoped_injectable::<Recursive>().unwrap();
    let scope = registry.create_scope().unwrap();

    match scope.get_service::<Recursive>() {
        Err(DependencyError::ResolutionDepthExceeded { max_depth, .. }) => {
            assert_eq!(max_depth, 8);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("recursive service resolved"),
    }
}

#[test]
fn failing_injection_is_reported_as_creation_error() {
    init_test_logging();

    #[derive(Debug, thiserror::Error)]
    #[error("pool exhausted")]
    struct PoolExhausted;

    struct Strict;
    impl Component for Strict {}
    impl Injectable for Strict {
        type Dependencies = ();
        type Error = PoolExhausted;

        fn inject((): ()) -> Result<Self, Self::Error> {
            Err(PoolExhausted)
        }
    }

    let mut registry = ServiceRegistry::new();
    registry.register_scoped_injectable::<Strict>().unwrap();
    let scope = registry.create_scope().unwrap();

    match scope.get_service::<Strict>() {
        Err(DependencyError::ServiceCreation { type_name, source }) => {
            assert!(type_name.ends_with("Strict"));
            assert_eq!(source.to_string(), "pool exhausted");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("Strict resolved"),
    }
}

#[test]
fn failing_implementation_is_reported_under_its_interface() {
    init_test_logging();

    #[derive(Debug, thiserror::Error)]
    #[error("handshake rejected")]
    struct HandshakeRejected;

    struct RejectedConnection;
    impl Component for RejectedConnection {}
    impl Connection for RejectedConnection {
        fn id(&self) -> usize {
            0
        }
    }
    impl Injectable for RejectedConnection {
        type Dependencies = ();
        type Error = HandshakeRejected;

        fn inject((): ()) -> Result<Self, Self::Error> {
            Err(HandshakeRejected)
        }
    }

    let mut registry = ServiceRegistry::new();
    registry
        .register_scoped_as::<dyn Connection, RejectedConnection, _>(|c| c as Arc<dyn Connection>)
        .unwrap();
    registry.register_scoped_injectable::<Repo>().unwrap();
    let scope = registry.create_scope().unwrap();

    for result in [
        scope.get_service::<dyn Connection>().map(|_| ()),
        scope.get_service::<Repo>().map(|_| ()),
    ] {
        match result {
            Err(DependencyError::ServiceCreation { type_name, source }) => {
                assert_eq!(type_name, std::any::type_name::<dyn Connection>());
                assert_eq!(source.to_string(), "handshake rejected");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => panic!("rejected connection resolved"),
        }
    }
}
