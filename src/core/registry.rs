//! # Service Registry - 싱글톤 의존성 주입 시스템
//!
//! `#[service]`, `#[repository]` 매크로가 생성하는 등록 정보를 `inventory`로 수집하고,
//! `ServiceLocator`가 타입별 싱글톤 인스턴스를 지연 생성/보관합니다.
//!
//! ## 동작 방식
//!
//! ```text
//! 1. 컴파일 타임
//!    ├─ #[service(name = "book")]           → ServiceRegistration
//!    ├─ #[repository(name = "book", ...)]   → RepositoryRegistration
//!    └─ inventory::collect!                 → 전역 레지스트리
//!
//! 2. 런타임 초기화
//!    ├─ Database, RedisClient 직접 생성
//!    └─ ServiceLocator::set()으로 등록
//!
//! 3. 의존성 주입
//!    ├─ Arc<T> 필드 → ServiceLocator::get::<T>()
//!    └─ 캐시 확인 → 없으면 생성자 호출 후 캐시
//! ```
//!
//! ## 이름 규칙
//!
//! 타입 이름에서 `Repository` / `Service` 접미사를 떼고 소문자로 바꾼 값이
//! 등록 이름과 일치해야 합니다.
//!
//! | 타입 | 등록 이름 |
//! |------|-----------|
//! | `BookRepository` | `book` |
//! | `BookCopyRepository` | `bookcopy` |
//! | `CirculationService` | `circulation` |
//! | `BookImportService` | `bookimport` |
//!
//! 생성자는 어떤 락도 잡지 않은 상태에서 호출되므로 중첩 의존성 해석이 안전합니다.
//! 순환 참조는 `initializing` 집합으로 감지하며, 발견 시 즉시 패닉합니다.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use crate::utils::display_terminal::{print_boxed_title, print_cache_initialized, print_final_summary, print_step_complete, print_step_start, print_sub_task};

/// 비즈니스 서비스 공통 인터페이스
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// 데이터 액세스 컴포넌트 공통 인터페이스
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    fn collection_name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

pub struct ServiceRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

pub struct RepositoryRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ServiceRegistration);
inventory::collect!(RepositoryRegistration);

static SERVICE_NAME_CACHE: Lazy<HashMap<String, &'static ServiceRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<ServiceRegistration>()
        .map(|registration| (extract_clean_name_static(registration.name), registration))
        .collect();

    print_cache_initialized("Service", cache.len());
    cache
});

static REPOSITORY_NAME_CACHE: Lazy<HashMap<String, &'static RepositoryRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<RepositoryRegistration>()
        .map(|registration| (extract_clean_name_static(registration.name), registration))
        .collect();

    print_cache_initialized("Repository", cache.len());
    cache
});

/// 등록 이름에서 `_service` / `_repository` 접미사 제거
fn extract_clean_name_static(name: &str) -> String {
    name.strip_suffix("_service")
        .or_else(|| name.strip_suffix("_repository"))
        .unwrap_or(name)
        .to_string()
}

/// 조회 대상 컴포넌트 종류와 캐시 키
#[derive(Debug, PartialEq)]
enum LookupKey {
    Repository(String),
    Service(String),
}

impl LookupKey {
    /// 타입 경로에서 레지스트리 조회 키를 만듭니다.
    ///
    /// `crate::repositories::books::BookCopyRepository` → `Repository("bookcopy")`
    fn from_type_name(type_name: &str) -> Option<Self> {
        let clean = ServiceLocator::extract_clean_type_name(type_name);

        if clean.contains("Repository") {
            let entity = clean.strip_suffix("Repository").unwrap_or(&clean).to_lowercase();
            return Some(LookupKey::Repository(entity));
        }
        if clean.contains("Service") {
            let entity = clean.strip_suffix("Service").unwrap_or(&clean).to_lowercase();
            return Some(LookupKey::Service(entity));
        }
        None
    }
}

/// 전역 싱글톤 컨테이너
pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    initializing: RwLock<HashSet<TypeId>>,
}

/// 초기화 중 패닉이 나더라도 `initializing` 표시를 지우는 가드
struct InitializingGuard(TypeId);

impl Drop for InitializingGuard {
    fn drop(&mut self) {
        LOCATOR.initializing_write().remove(&self.0);
    }
}

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            initializing: RwLock::new(HashSet::new()),
        }
    }

    fn instances_read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
        self.instances.read().unwrap_or_else(|e| e.into_inner())
    }

    fn instances_write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<dyn Any + Send + Sync>>> {
        self.instances.write().unwrap_or_else(|e| e.into_inner())
    }

    fn initializing_write(&self) -> RwLockWriteGuard<'_, HashSet<TypeId>> {
        self.initializing.write().unwrap_or_else(|e| e.into_inner())
    }

    fn cached<T: 'static + Send + Sync>(type_id: TypeId) -> Option<Arc<T>> {
        LOCATOR
            .instances_read()
            .get(&type_id)
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 타입 `T`의 싱글톤 인스턴스를 반환합니다.
    ///
    /// 캐시에 없으면 등록된 생성자를 찾아 호출합니다. 등록되지 않은 타입,
    /// 순환 참조, 타입 불일치는 시작 단계의 구성 오류이므로 패닉합니다.
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(instance) = Self::cached::<T>(type_id) {
            return instance;
        }

        if !LOCATOR.initializing_write().insert(type_id) {
            log::error!("❌ Circular dependency detected for type: {}", type_name);
            panic!("Circular dependency detected: {} is already being initialized", type_name);
        }
        let _guard = InitializingGuard(type_id);

        let (registration_name, boxed_instance) = match LookupKey::from_type_name(type_name) {
            Some(LookupKey::Repository(entity)) => {
                let registration = REPOSITORY_NAME_CACHE
                    .get(&entity)
                    .unwrap_or_else(|| panic!("No repository found for entity: {}", entity));
                (registration.name, (registration.constructor)())
            }
            Some(LookupKey::Service(entity)) => {
                let registration = SERVICE_NAME_CACHE
                    .get(&entity)
                    .unwrap_or_else(|| panic!("No service found for entity: {}", entity));
                (registration.name, (registration.constructor)())
            }
            None => panic!(
                "Service not found: {}. Make sure it's registered with #[service] or #[repository] macro, or manually registered with ServiceLocator::set()",
                type_name
            ),
        };

        let instance = Self::downcast_instance::<T>(boxed_instance)
            .unwrap_or_else(|| panic!("Type mismatch for component: {}", registration_name));

        // 생성자 내부에서 이미 등록되었다면 먼저 등록된 인스턴스를 사용
        let mut instances = LOCATOR.instances_write();
        let stored = instances
            .entry(type_id)
            .or_insert_with(|| instance.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        drop(instances);

        stored.downcast::<T>().unwrap_or(instance)
    }

    /// 생성자가 돌려준 박스에서 `Arc<T>`를 꺼냅니다.
    fn downcast_instance<T: 'static + Send + Sync>(boxed: Box<dyn Any + Send + Sync>) -> Option<Arc<T>> {
        let boxed = match boxed.downcast::<Arc<T>>() {
            Ok(arc) => return Some(*arc),
            Err(other) => other,
        };
        match boxed.downcast::<Arc<dyn Any + Send + Sync>>() {
            Ok(any) => (*any).downcast::<T>().ok(),
            Err(_) => None,
        }
    }

    fn extract_clean_type_name(type_name: &str) -> String {
        match type_name.rfind("::") {
            Some(pos) => type_name[pos + 2..].to_string(),
            None => type_name.to_string(),
        }
    }

    /// 인프라 컴포넌트(`Database`, `RedisClient`)를 직접 등록합니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        let type_id = TypeId::of::<T>();
        let clean_name = Self::extract_clean_type_name(std::any::type_name::<T>());

        log::info!("📦 Registering: {}", clean_name);

        LOCATOR.instances_write().insert(type_id, instance as Arc<dyn Any + Send + Sync>);
    }

    /// 등록된 타입이 이미 생성되었는지 확인
    pub fn contains<T: 'static + Send + Sync>() -> bool {
        LOCATOR.instances_read().contains_key(&TypeId::of::<T>())
    }

    /// 모든 리포지토리와 서비스를 미리 생성합니다.
    ///
    /// 리포지토리를 먼저 만든 뒤 서비스를 만들어, 서비스 생성 시점에는
    /// 의존하는 리포지토리가 이미 캐시에 있도록 합니다.
    pub async fn initialize_all() -> Result<(), Box<dyn std::error::Error>> {
        print_boxed_title("🔄 INITIALIZING SERVICE REGISTRY");

        let repo_registrations: Vec<_> = inventory::iter::<RepositoryRegistration>().collect();
        let repo_count = repo_registrations.len();

        if repo_count > 0 {
            print_step_start(1, "Creating Repository instances");

            for registration in repo_registrations {
                print_sub_task(registration.name, "Creating...");
                let _boxed_instance = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }

            print_step_complete(1, "Repository instances created", repo_count);
        }

        let service_registrations: Vec<_> = inventory::iter::<ServiceRegistration>().collect();
        let service_count = service_registrations.len();

        if service_count > 0 {
            print_step_start(2, "Creating Service instances");

            for registration in service_registrations {
                print_sub_task(registration.name, "Creating...");
                let _boxed_instance = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }

            print_step_complete(2, "Service instances created", service_count);
        }

        print_final_summary(repo_count, service_count);

        Ok(())
    }
}

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualComponent {
        value: u32,
    }

    #[test]
    fn test_clean_registration_names() {
        assert_eq!(extract_clean_name_static("book_service"), "book");
        assert_eq!(extract_clean_name_static("transaction_repository"), "transaction");
        assert_eq!(extract_clean_name_static("bookcopy"), "bookcopy");
    }

    #[test]
    fn test_lookup_key_from_type_path() {
        assert_eq!(
            LookupKey::from_type_name("library::repositories::books::BookCopyRepository"),
            Some(LookupKey::Repository("bookcopy".to_string()))
        );
        assert_eq!(
            LookupKey::from_type_name("library::services::books::BookImportService"),
            Some(LookupKey::Service("bookimport".to_string()))
        );
        assert_eq!(LookupKey::from_type_name("library::db::Database"), None);
    }

    #[test]
    fn test_manual_registration_is_returned() {
        ServiceLocator::set(Arc::new(ManualComponent { value: 7 }));

        assert!(ServiceLocator::contains::<ManualComponent>());
        assert_eq!(ServiceLocator::get::<ManualComponent>().value, 7);
    }

    #[test]
    fn test_downcast_instance_accepts_arc_box() {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(Arc::new(ManualComponent { value: 3 }));
        let instance = ServiceLocator::downcast_instance::<ManualComponent>(boxed);
        assert_eq!(instance.map(|c| c.value), Some(3));
    }
}
