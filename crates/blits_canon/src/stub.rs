//! Engine that knows nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::{
    CompletionEntry, DefinitionTarget, EngineDiagnostic, QuickInfo, ScriptEngine,
    ScriptEngineFactory, SignatureHelp,
};
use crate::error::EngineError;

/// Answers every query with an empty result.
///
/// Stands in wherever no project engine applies, so "no engine" and
/// "nothing found" look the same to callers.
#[derive(Debug, Default, Clone)]
pub struct StubEngine {
    root: PathBuf,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScriptEngine for StubEngine {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn sync_document(&self, _name: &str, _text: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn close_document(&self, _name: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn completions(
        &self,
        _name: &str,
        _offset: usize,
    ) -> Result<Vec<CompletionEntry>, EngineError> {
        Ok(Vec::new())
    }

    async fn quick_info(
        &self,
        _name: &str,
        _offset: usize,
    ) -> Result<Option<QuickInfo>, EngineError> {
        Ok(None)
    }

    async fn definition(
        &self,
        _name: &str,
        _offset: usize,
    ) -> Result<Vec<DefinitionTarget>, EngineError> {
        Ok(Vec::new())
    }

    async fn signature_help(
        &self,
        _name: &str,
        _offset: usize,
    ) -> Result<Option<SignatureHelp>, EngineError> {
        Ok(None)
    }

    async fn diagnostics(&self, _name: &str) -> Result<Vec<EngineDiagnostic>, EngineError> {
        Ok(Vec::new())
    }

    async fn shutdown(&self) {}
}

/// Hands out [`StubEngine`]s; used when no real engine is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubEngineFactory;

#[async_trait]
impl ScriptEngineFactory for StubEngineFactory {
    async fn create(&self, root: &Path) -> Result<Arc<dyn ScriptEngine>, EngineError> {
        Ok(Arc::new(StubEngine {
            root: root.to_path_buf(),
        }))
    }
}
