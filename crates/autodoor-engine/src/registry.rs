//! 모듈 등록 테이블.
//!
//! 등록 시점에 이름을 구체 모듈 객체로 고정한다. 이름은 고유하며
//! 등록 순서가 시작/정지 순서가 된다.

use std::sync::Arc;

use autodoor_core::error::CoreError;
use autodoor_core::ports::module::MonitorModule;

/// 모듈 레지스트리
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn MonitorModule>>,
}

impl ModuleRegistry {
    /// 빈 레지스트리
    pub fn new() -> Self {
        Self::default()
    }

    /// 모듈 등록. 같은 이름이 있으면 `DuplicateModule`.
    pub fn register(&mut self, module: Arc<dyn MonitorModule>) -> Result<(), CoreError> {
        if self.get(module.name()).is_some() {
            return Err(CoreError::DuplicateModule(module.name().to_string()));
        }
        self.modules.push(module);
        Ok(())
    }

    /// 이름으로 조회
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MonitorModule>> {
        self.modules.iter().find(|m| m.name() == name)
    }

    /// 등록 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MonitorModule>> {
        self.modules.iter()
    }

    /// 등록된 이름 (등록 순서)
    pub fn names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl MonitorModule for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn label(&self) -> &str {
            self.0
        }
        async fn start(&self) -> Result<(), CoreError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), CoreError> {
            Ok(())
        }
        fn is_running(&self) -> bool {
            false
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Named("a"))).unwrap();
        registry.register(Arc::new(Named("b"))).unwrap();
        let err = registry.register(Arc::new(Named("a"))).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateModule(name) if name == "a"));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.get("b").is_some());
        assert!(registry.get("c").is_none());
    }
}
