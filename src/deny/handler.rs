//! Deny handler implementations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rhai::{Dynamic, FnPtr, AST};
use std::sync::Arc;

use crate::scripting::error::ScriptResult;
use crate::scripting::pool::ExecutionContext;

/// Body of the built-in denial response.
pub const PERMISSION_DENIED: &str = "Permission denied.";

/// Something that can answer a denied request inside an execution context.
///
/// Implemented by script function pointers and by plain Rust closures.
pub trait DenyCallable: Send + Sync {
    fn invoke(&self, ctx: &ExecutionContext) -> ScriptResult<()>;

    /// Short label for logs.
    fn name(&self) -> String {
        "native".to_string()
    }
}

impl<F> DenyCallable for F
where
    F: Fn(&ExecutionContext) -> ScriptResult<()> + Send + Sync,
{
    fn invoke(&self, ctx: &ExecutionContext) -> ScriptResult<()> {
        self(ctx)
    }
}

/// A script function handed to `DenyHandler`.
///
/// Variables captured by a closure are detached from the installing run:
/// each invocation starts from its own copy of their values, so no two
/// requests (and not the startup run) see each other's writes.
#[derive(Debug, Clone)]
pub struct ScriptDenyHandler {
    function: FnPtr,
    script: Arc<AST>,
}

impl ScriptDenyHandler {
    pub fn new(mut function: FnPtr, script: Arc<AST>) -> Self {
        let captured: Vec<Dynamic> = function.curry().iter().map(Dynamic::flatten_clone).collect();
        function.set_curry(captured);
        Self { function, script }
    }
}

impl DenyCallable for ScriptDenyHandler {
    fn invoke(&self, ctx: &ExecutionContext) -> ScriptResult<()> {
        let _: Dynamic = self.function.call(ctx.engine(), &self.script, ())?;
        Ok(())
    }

    fn name(&self) -> String {
        self.function.fn_name().to_string()
    }
}

/// The immutable fallback: 403 with a short plain-text body.
pub fn permission_denied() -> Response {
    (StatusCode::FORBIDDEN, PERMISSION_DENIED).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuntimeConfig, ScriptingConfig};
    use crate::deny::slot::{DenySlot, DenyState};
    use crate::scripting::bridge::Bridge;
    use crate::scripting::exchange::{Exchange, RequestInfo};
    use crate::scripting::pool::ContextPool;
    use crate::security::registry::PermissionRegistry;
    use axum::{body::Body, http::Request};
    use rhai::Engine;
    use std::sync::RwLock;

    const COUNTING_HANDLER: &str = r#"
        let hits = 0;
        DenyHandler(|| {
            hits += 1;
            print(hits.to_string());
        });
        hits = 10;
    "#;

    fn installed(source: &str) -> (Arc<ContextPool>, Arc<dyn DenyCallable>) {
        let slot = Arc::new(DenySlot::new());
        let ast = Arc::new(Engine::new().compile(source).unwrap());
        let bridge = Bridge::new(
            Arc::new(RwLock::new(RuntimeConfig::default())),
            Arc::new(PermissionRegistry::new()),
            slot.clone(),
        )
        .with_script(ast.clone());
        let pool = Arc::new(ContextPool::new(bridge, &ScriptingConfig::default()));
        pool.unbound().run(&ast).unwrap();

        let handler = match &*slot.current() {
            DenyState::Custom(handler) => handler.clone(),
            DenyState::Default => panic!("handler not installed"),
        };
        (pool, handler)
    }

    fn exchange(path: &str) -> Exchange {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        Exchange::new(RequestInfo::from_request(&req))
    }

    #[tokio::test]
    async fn test_captured_variables_start_fresh_each_call() {
        let (pool, handler) = installed(COUNTING_HANDLER);

        for path in ["/admin/1", "/admin/2", "/admin/3"] {
            let exchange = exchange(path);
            let ctx = pool.checkout(exchange.clone()).await.unwrap();
            handler.invoke(&ctx).unwrap();
            assert_eq!(exchange.sink().body(), "1\n");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_do_not_share_captures() {
        let (pool, handler) = installed(COUNTING_HANDLER);

        let mut tasks = Vec::new();
        for i in 0..16 {
            let exchange = exchange(&format!("/admin/{}", i));
            let ctx = pool.checkout(exchange.clone()).await.unwrap();
            let handler = handler.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                handler.invoke(&ctx).unwrap();
                exchange.sink().body()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), "1\n");
        }
    }

    #[test]
    fn test_handler_name() {
        let handler = ScriptDenyHandler::new(FnPtr::new("denied").unwrap(), Arc::new(AST::empty()));
        assert_eq!(handler.name(), "denied");
    }
}
