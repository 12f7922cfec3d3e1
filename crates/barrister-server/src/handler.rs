//! Binding handler implementations to IDL interfaces
//!
//! An [`InterfaceHandler`] records one typed closure per operation. Each
//! closure's parameter tuple and return type supply the target shapes checked
//! at registration and used for conversion at call time.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::{HandlerInstance, RequestContext};
use crate::error::{IntoRpcError, RpcError};
use crate::shape::{Shaped, TargetShape};

/// Handlers that want a fresh instance for every call
///
/// The clone receives the request context, so per-request state such as the
/// caller's identity can be set up before any filter runs.
pub trait Cloneable: Send + Sync + 'static {
    fn clone_for_request(&self, request: &RequestContext) -> Self
    where
        Self: Sized;
}

/// Positional parameter lists, implemented for tuples of up to six values
pub trait Params: Sized + Send + 'static {
    fn shapes() -> Vec<TargetShape>;

    /// Build the typed tuple from converted values
    fn from_values(values: Vec<Value>) -> Result<Self, serde_json::Error>;
}

impl Params for () {
    fn shapes() -> Vec<TargetShape> {
        Vec::new()
    }

    fn from_values(_values: Vec<Value>) -> Result<Self, serde_json::Error> {
        Ok(())
    }
}

macro_rules! impl_params_tuple {
    ($($ty:ident),+) => {
        impl<$($ty),+> Params for ($($ty,)+)
        where
            $($ty: Shaped + DeserializeOwned + Send + 'static),+
        {
            fn shapes() -> Vec<TargetShape> {
                vec![$(<$ty as Shaped>::shape()),+]
            }

            fn from_values(values: Vec<Value>) -> Result<Self, serde_json::Error> {
                let mut values = values.into_iter();
                Ok(($(serde_json::from_value::<$ty>(values.next().unwrap_or(Value::Null))?,)+))
            }
        }
    };
}

impl_params_tuple!(T1);
impl_params_tuple!(T1, T2);
impl_params_tuple!(T1, T2, T3);
impl_params_tuple!(T1, T2, T3, T4);
impl_params_tuple!(T1, T2, T3, T4, T5);
impl_params_tuple!(T1, T2, T3, T4, T5, T6);

type Invoker =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>, Vec<Value>) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync>;

type Cloner = Arc<dyn Fn(&RequestContext) -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// One entry of an interface's dispatch table
#[derive(Clone)]
pub struct OperationBinding {
    name: String,
    params: Vec<TargetShape>,
    returns: TargetShape,
    invoker: Invoker,
}

impl OperationBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_shapes(&self) -> &[TargetShape] {
        &self.params
    }

    pub fn return_shape(&self) -> &TargetShape {
        &self.returns
    }

    /// Call the operation with already converted arguments
    pub(crate) fn invoke(
        &self,
        handler: Arc<dyn Any + Send + Sync>,
        args: Vec<Value>,
    ) -> BoxFuture<'static, Result<Value, RpcError>> {
        (self.invoker)(handler, args)
    }
}

impl std::fmt::Debug for OperationBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationBinding")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Builder binding a handler value to one IDL interface
///
/// ```rust
/// use barrister_server::{InterfaceHandler, RpcError};
///
/// struct Echo;
///
/// impl Echo {
///     async fn echo(&self, s: String) -> Result<Option<String>, RpcError> {
///         Ok((s != "return-null").then_some(s))
///     }
/// }
///
/// let handler = InterfaceHandler::new("Echo", Echo)
///     .operation("echo", |h, (s,): (String,)| async move { h.echo(s).await });
/// assert_eq!(handler.operation_names().count(), 1);
/// ```
pub struct InterfaceHandler<H> {
    interface: String,
    handler: Arc<H>,
    cloner: Option<fn(&H, &RequestContext) -> H>,
    operations: Vec<OperationBinding>,
}

impl<H: Send + Sync + 'static> InterfaceHandler<H> {
    pub fn new(interface: impl Into<String>, handler: H) -> Self {
        Self::from_arc(interface, Arc::new(handler))
    }

    pub fn from_arc(interface: impl Into<String>, handler: Arc<H>) -> Self {
        Self {
            interface: interface.into(),
            handler,
            cloner: None,
            operations: Vec::new(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.name.as_str())
    }

    /// Register the closure serving `name`
    ///
    /// The closure receives the handler and the converted argument tuple.
    /// Registering the same name twice replaces the earlier closure.
    pub fn operation<P, R, E, F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        P: Params,
        R: Shaped + Serialize + Send + 'static,
        E: IntoRpcError + Send + 'static,
        F: Fn(Arc<H>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let name = name.into();
        let method = format!("{}.{}", self.interface, name);
        let f = Arc::new(f);

        let invoker: Invoker = Arc::new(move |instance: Arc<dyn Any + Send + Sync>, args: Vec<Value>| {
            let f = f.clone();
            let method = method.clone();
            async move {
                let handler = instance.downcast::<H>().map_err(|_| {
                    RpcError::internal(format!("handler for {} has an unexpected type", method))
                })?;
                let params = P::from_values(args).map_err(|e| {
                    RpcError::invalid_params(format!("Method {} received invalid params: {}", method, e))
                })?;
                let result = (*f)(handler, params)
                    .await
                    .map_err(|e| e.into_rpc_error(&method))?;
                serde_json::to_value(result).map_err(|e| {
                    RpcError::internal(format!("Method {} returned a value that cannot be encoded: {}", method, e))
                })
            }
            .boxed()
        });

        let binding = OperationBinding {
            name,
            params: P::shapes(),
            returns: R::shape(),
            invoker,
        };
        match self.operations.iter().position(|op| op.name == binding.name) {
            Some(index) => self.operations[index] = binding,
            None => self.operations.push(binding),
        }
        self
    }

    pub(crate) fn into_bound(self) -> BoundInterface {
        let cloner = self.cloner.map(|clone_fn| {
            let handler = self.handler.clone();
            Arc::new(move |request: &RequestContext| {
                Box::new(clone_fn(&handler, request)) as Box<dyn Any + Send + Sync>
            }) as Cloner
        });

        BoundInterface {
            interface: self.interface,
            instance: self.handler,
            cloner,
            operations: self
                .operations
                .into_iter()
                .map(|op| (op.name.clone(), op))
                .collect(),
        }
    }
}

impl<H: Cloneable> InterfaceHandler<H> {
    /// Clone the handler for every call instead of sharing it
    pub fn cloneable(mut self) -> Self {
        self.cloner = Some(H::clone_for_request);
        self
    }
}

/// A type-erased, registered interface handler
pub struct BoundInterface {
    interface: String,
    instance: Arc<dyn Any + Send + Sync>,
    cloner: Option<Cloner>,
    operations: HashMap<String, OperationBinding>,
}

impl BoundInterface {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn is_cloneable(&self) -> bool {
        self.cloner.is_some()
    }

    pub fn operation(&self, name: &str) -> Option<&OperationBinding> {
        self.operations.get(name)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Handler instance for one call: a fresh clone when cloneable
    pub fn instance(&self, request: &RequestContext) -> HandlerInstance {
        match &self.cloner {
            Some(clone) => HandlerInstance::Owned(clone(request)),
            None => HandlerInstance::Shared(self.instance.clone()),
        }
    }
}

impl std::fmt::Debug for BoundInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundInterface")
            .field("interface", &self.interface)
            .field("cloneable", &self.is_cloneable())
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct Calc {
        user: String,
    }

    impl Calc {
        async fn add(&self, a: i64, b: i64) -> Result<i64, RpcError> {
            Ok(a + b)
        }

        async fn whoami(&self) -> Result<String, RpcError> {
            Ok(self.user.clone())
        }

        async fn fail(&self) -> Result<bool, anyhow::Error> {
            Err(anyhow::anyhow!("boom"))
        }
    }

    impl Cloneable for Calc {
        fn clone_for_request(&self, request: &RequestContext) -> Self {
            Calc {
                user: request.header("x-user").unwrap_or("anon").to_string(),
            }
        }
    }

    fn calc() -> InterfaceHandler<Calc> {
        InterfaceHandler::new("Calc", Calc::default())
            .operation("add", |h: Arc<Calc>, (a, b): (i64, i64)| async move { h.add(a, b).await })
            .operation("whoami", |h: Arc<Calc>, (): ()| async move { h.whoami().await })
            .operation("fail", |h: Arc<Calc>, (): ()| async move { h.fail().await })
    }

    #[tokio::test]
    async fn test_binding_shapes_and_invoke() {
        let bound = calc().into_bound();
        assert!(!bound.is_cloneable());

        let add = bound.operation("add").unwrap();
        assert_eq!(add.arity(), 2);
        assert_eq!(add.param_shapes()[0].to_string(), "i64");
        assert_eq!(add.return_shape().to_string(), "i64");

        let instance = bound.instance(&RequestContext::new());
        let HandlerInstance::Shared(shared) = instance else {
            panic!("expected shared instance");
        };
        let result = add.invoke(shared, vec![json!(2), json!(3)]).await;
        assert_eq!(result, Ok(json!(5)));
    }

    #[tokio::test]
    async fn test_foreign_error_wrapped() {
        let bound = calc().into_bound();
        let mut instance = bound.instance(&RequestContext::new());
        let err = bound
            .operation("fail")
            .unwrap()
            .invoke(instance.freeze(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "method 'Calc.fail' raised unknown error: boom");
    }

    #[tokio::test]
    async fn test_cloneable_instances() {
        let bound = calc().cloneable().into_bound();
        assert!(bound.is_cloneable());

        let request = RequestContext::new().with_header("X-User", "100");
        let mut instance = bound.instance(&request);
        assert!(!instance.is_shared());
        assert_eq!(instance.downcast_ref::<Calc>().unwrap().user, "100");
        instance.downcast_mut::<Calc>().unwrap().user.push('1');

        let result = bound
            .operation("whoami")
            .unwrap()
            .invoke(instance.freeze(), vec![])
            .await;
        assert_eq!(result, Ok(json!("1001")));
    }

    #[tokio::test]
    async fn test_wrong_handler_type_is_internal_error() {
        let bound = calc().into_bound();
        let err = bound
            .operation("whoami")
            .unwrap()
            .invoke(Arc::new(String::from("not a calc")), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.code, -32603);
    }

    #[test]
    fn test_operation_replaced() {
        let handler = calc().operation("add", |_h: Arc<Calc>, (a,): (i64,)| async move {
            Ok::<_, RpcError>(a)
        });
        let names: Vec<_> = handler.operation_names().collect();
        assert_eq!(names, vec!["add", "whoami", "fail"]);
        assert_eq!(handler.into_bound().operation("add").unwrap().arity(), 1);
    }
}
