//! Script injection errors.

use thiserror::Error;

use crate::script::ScriptModule;
use crate::types::TabId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    #[error("Cannot access contents of restricted page: {0}")]
    Restricted(String),

    #[error("No tab with id: {0}")]
    TabNotFound(TabId),

    #[error("Module {module} requires {missing} to be loaded first")]
    MissingDependency {
        module: ScriptModule,
        missing: ScriptModule,
    },

    #[error("Script injection failed: {0}")]
    Failed(String),
}
