//! REST endpoints
//!
//! Endpoint types are described here and mounted in create_app(). Each
//! routable method is paired with a handler closure; the dispatcher matches
//! the request against the collected routes and binds the handler arguments.

use super::*;
use regex::Regex;
use rest_binding::extract::{decode_query_value, parse_query};
use rest_binding::{
    Annotation, BeanFactory, BoxError, ContextProviderFactory, MethodDescriptor, ParamDescriptor,
    ReaderFactory, RouteEntry, RouteMetadataCollector, TypeDescriptor, TypeRef, get_arguments,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header carrying the caller name.
pub const USER_HEADER: &str = "X-User";

/// Handles one route. Receives the bound arguments in declaration order.
pub type Handler =
    Arc<dyn Fn(&AppContext, &[Option<Value>]) -> Result<Value, AppError> + Send + Sync>;

// =============================================================================
// Descriptors
// =============================================================================

pub fn interface_rest() -> Arc<TypeDescriptor> {
    TypeDescriptor::interface("InterfaceRest")
        .annotate(Annotation::path("interface"))
        .annotate(Annotation::produces(["application/json"]))
        .method(
            MethodDescriptor::new("echo")
                .returns(TypeRef::string())
                .annotate(Annotation::Get)
                .annotate(Annotation::path("echo"))
                .annotate(Annotation::consumes(["application/json"]))
                .param(ParamDescriptor::new(TypeRef::string()).query("name")),
        )
        .build()
}

pub fn interface_rest_impl() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("InterfaceRestImpl")
        .implements(interface_rest())
        .method(
            MethodDescriptor::new("echo")
                .returns(TypeRef::string())
                .param(ParamDescriptor::new(TypeRef::string())),
        )
        .build()
}

pub fn user_api() -> Arc<TypeDescriptor> {
    TypeDescriptor::interface("UserApi")
        .annotate(Annotation::path("users"))
        .annotate(Annotation::produces(["application/json"]))
        .method(
            MethodDescriptor::new("get")
                .annotate(Annotation::Get)
                .annotate(Annotation::path("{id:[0-9]+}"))
                .param(ParamDescriptor::new(TypeRef::long()).path("id")),
        )
        .method(
            MethodDescriptor::new("list")
                .annotate(Annotation::Get)
                .param(
                    ParamDescriptor::new(TypeRef::integer())
                        .query("limit")
                        .default_value("10"),
                )
                .param(ParamDescriptor::new(TypeRef::named("ListFilter")).bean()),
        )
        .method(
            MethodDescriptor::new("create")
                .annotate(Annotation::Post)
                .annotate(Annotation::consumes(["application/json"]))
                .param(ParamDescriptor::new(TypeRef::named("CreateUserInput"))),
        )
        .method(
            MethodDescriptor::new("me")
                .annotate(Annotation::Get)
                .annotate(Annotation::path("me"))
                .param(ParamDescriptor::new(TypeRef::named("CurrentUser")).context()),
        )
        .build()
}

pub fn user_resource() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("UserResource")
        .implements(user_api())
        .method(MethodDescriptor::new("get").param(ParamDescriptor::new(TypeRef::long())))
        .method(
            MethodDescriptor::new("create")
                .param(ParamDescriptor::new(TypeRef::named("CreateUserInput"))),
        )
        .method(
            MethodDescriptor::new("me").param(ParamDescriptor::new(TypeRef::named("CurrentUser"))),
        )
        .method(
            MethodDescriptor::new("validate_email")
                .param(ParamDescriptor::new(TypeRef::string())),
        )
        .build()
}

pub fn health_resource() -> Arc<TypeDescriptor> {
    TypeDescriptor::class("HealthResource")
        .annotate(Annotation::path("health"))
        .method(MethodDescriptor::new("health").annotate(Annotation::Get))
        .build()
}

// =============================================================================
// Handlers
// =============================================================================

/// Deserialize the bound argument at `index`.
fn arg<T: DeserializeOwned>(args: &[Option<Value>], index: usize) -> Result<Option<T>, AppError> {
    match args.get(index).cloned().flatten() {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::BadRequest(e.to_string())),
        None => Ok(None),
    }
}

fn echo(_ctx: &AppContext, args: &[Option<Value>]) -> Result<Value, AppError> {
    let name: Option<String> = arg(args, 0)?;
    Ok(json!(name))
}

fn get_user(ctx: &AppContext, args: &[Option<Value>]) -> Result<Value, AppError> {
    let id: u64 = arg(args, 0)?.ok_or_else(|| AppError::BadRequest("id".into()))?;
    ctx.db
        .get_user(id)
        .map(|user| json!(user))
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
}

fn list_users(ctx: &AppContext, args: &[Option<Value>]) -> Result<Value, AppError> {
    let limit: usize = arg(args, 0)?.unwrap_or(10);
    let filter: ListFilter = arg(args, 1)?.unwrap_or_default();
    Ok(json!(ctx.db.list_users(filter.q.as_deref(), limit)))
}

fn create_user(ctx: &AppContext, args: &[Option<Value>]) -> Result<Value, AppError> {
    let input: CreateUserInput =
        arg(args, 0)?.ok_or_else(|| AppError::BadRequest("Missing request body".into()))?;
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".into()));
    }

    ctx.db
        .create_user(&input.name, &input.email)
        .map(|user| json!(user))
        .ok_or_else(|| AppError::BadRequest("User store unavailable".into()))
}

fn me(_ctx: &AppContext, args: &[Option<Value>]) -> Result<Value, AppError> {
    let user: CurrentUser = arg(args, 0)?.ok_or(AppError::Unauthorized)?;
    Ok(json!(user))
}

fn health(_ctx: &AppContext, _args: &[Option<Value>]) -> Result<Value, AppError> {
    Ok(json!(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    }))
}

// =============================================================================
// Dispatch
// =============================================================================

enum Segment {
    Literal(String),
    Param {
        name: String,
        pattern: Option<Regex>,
    },
}

struct Route {
    entry: RouteEntry,
    segments: Vec<Segment>,
    handler: Handler,
}

impl Route {
    fn compile(entry: RouteEntry, handler: Handler) -> Result<Self, regex::Error> {
        let definition = &entry.definition;
        let mut segments = Vec::new();

        for (index, item) in definition.path().split('/').enumerate() {
            let segment = match definition.path_params().iter().find(|p| p.segment == index) {
                Some(param) => Segment::Param {
                    name: param.name.clone(),
                    pattern: param
                        .pattern
                        .as_deref()
                        .map(|p| Regex::new(&format!("^(?:{})$", p)))
                        .transpose()?,
                },
                None => Segment::Literal(item.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            entry,
            segments,
            handler,
        })
    }

    /// Path parameters captured from `path`, or `None` if it does not match.
    fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let items: Vec<&str> = path.split('/').collect();
        if items.len() != self.segments.len() {
            return None;
        }

        let regex_route = self.entry.definition.path_is_regex();
        let mut captures = Vec::new();
        for (index, (segment, item)) in self.segments.iter().zip(items).enumerate() {
            match segment {
                Segment::Literal(literal) if literal == item => {}
                Segment::Literal(_) => return None,
                Segment::Param { name, pattern } => {
                    if item.is_empty() || pattern.as_ref().is_some_and(|p| !p.is_match(item)) {
                        return None;
                    }
                    let key = if regex_route {
                        format!("param{}", index)
                    } else {
                        name.clone()
                    };
                    captures.push((key, item.to_string()));
                }
            }
        }

        Some(captures)
    }
}

/// Collected routes plus the registries used to bind their arguments.
pub struct RestApp {
    context: AppContext,
    collector: RouteMetadataCollector,
    mount_point: Option<String>,
    routes: Vec<Route>,
    readers: ReaderFactory,
    providers: ContextProviderFactory,
    beans: BeanFactory,
}

impl RestApp {
    pub fn new(config: RestConfig) -> Self {
        Self {
            context: AppContext::new(),
            collector: RouteMetadataCollector::new(config.clone()),
            mount_point: None,
            routes: Vec::new(),
            readers: ReaderFactory::new(config.clone()),
            providers: ContextProviderFactory::new(config),
            beans: BeanFactory::new(),
        }
    }

    #[must_use = "This method returns a new RestApp and does not modify self"]
    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = Some(mount_point.into());
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn readers(&self) -> &ReaderFactory {
        &self.readers
    }

    pub fn providers(&self) -> &ContextProviderFactory {
        &self.providers
    }

    pub fn beans(&self) -> &BeanFactory {
        &self.beans
    }

    /// Collect the routes of `ty` and pair each routable method with the
    /// handler registered under its name. Methods without a handler are not
    /// mounted.
    pub fn mount(
        &mut self,
        ty: &TypeDescriptor,
        handlers: Vec<(&str, Handler)>,
    ) -> Result<(), ConfigurationError> {
        let table = self.collector.collect(ty)?;

        for entry in table {
            if !entry.definition.is_routable() {
                continue;
            }
            let Some((_, handler)) = handlers.iter().find(|(name, _)| *name == entry.method.name)
            else {
                warn!(route = %entry.definition, method = %entry.method.name, "No handler, route not mounted");
                continue;
            };

            let method = entry.method.name.clone();
            let route = Route::compile(entry, Arc::clone(handler)).map_err(|e| {
                ConfigurationError::new(&ty.name, "Invalid path pattern")
                    .with_method(&method)
                    .with_source(e)
            })?;
            debug!(route = %route.entry.definition, method = %method, "Mounted route");
            self.routes.push(route);
        }

        Ok(())
    }

    /// Mounted routes, in mount order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(|r| &r.entry)
    }

    /// Dispatch a request to the first matching route.
    pub fn handle(&self, request: HttpRequest) -> Response {
        let path = request.path().to_string();
        let local = match self.mount_point.as_deref() {
            Some(mount) => match path.strip_prefix(mount) {
                Some(rest) => rest,
                None => return not_found(&path),
            },
            None => path.as_str(),
        };
        info!(method = %request.method(), path = %path, "Dispatching request");

        let found = self.routes.iter().find_map(|route| {
            if route.entry.definition.http_method() != Some(request.method()) {
                return None;
            }
            route.matches(local).map(|captures| (route, captures))
        });
        let Some((route, captures)) = found else {
            return not_found(&path);
        };

        let mut request = captures
            .into_iter()
            .fold(request, |request, (name, value)| request.with_path_param(name, value));
        if let Some(mount) = &self.mount_point {
            request = request.with_mount_point(mount.clone());
        }

        let args = match get_arguments(
            &route.entry.method,
            &route.entry.definition,
            &mut request,
            &self.readers,
            &self.providers,
            &self.beans,
        ) {
            Ok(args) => args,
            Err(e) => {
                warn!(error = %e, "Argument binding failed");
                let status = if e.kind.is_server_error() { 500 } else { 400 };
                return Response::error(status, e.to_details());
            }
        };

        match (route.handler)(&self.context, &args) {
            Ok(body) => Response::ok(body),
            Err(e) => {
                debug!(error = %e, "Handler failed");
                e.into_response()
            }
        }
    }
}

fn not_found(path: &str) -> Response {
    Response::error(
        404,
        json!({ "code": "NOT_FOUND", "message": format!("No route for {}", path) }),
    )
}

// =============================================================================
// App
// =============================================================================

fn handler<F>(f: F) -> Handler
where
    F: Fn(&AppContext, &[Option<Value>]) -> Result<Value, AppError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Create the application with all endpoints mounted under `/api`.
pub fn create_app() -> Result<RestApp, ConfigurationError> {
    let mut app = RestApp::new(RestConfig::default()).with_mount_point("/api");

    app.providers().register_for_type(
        "CurrentUser",
        |request: &dyn RequestContext| -> Result<Option<Value>, BoxError> {
            Ok(request.header(USER_HEADER).map(|name| json!({ "name": name })))
        },
    );
    app.beans().register(
        "ListFilter",
        |request: &dyn RequestContext| -> Result<Value, BoxError> {
            let q = request
                .query()
                .and_then(|query| parse_query(query).remove("q"))
                .map(decode_query_value);
            Ok(serde_json::to_value(ListFilter { q })?)
        },
    );

    app.mount(&interface_rest_impl(), vec![("echo", handler(echo))])?;
    app.mount(
        &user_resource(),
        vec![
            ("get", handler(get_user)),
            ("list", handler(list_users)),
            ("create", handler(create_user)),
            ("me", handler(me)),
        ],
    )?;
    app.mount(&health_resource(), vec![("health", handler(health))])?;

    Ok(app)
}
