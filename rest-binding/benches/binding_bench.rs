//! Collection and binding benchmarks
//!
//! These benchmarks measure:
//! - Route collection across hierarchies of growing depth
//! - Argument binding for query, path and body parameters

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rest_binding::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

fn echo_api() -> Arc<TypeDescriptor> {
    TypeDescriptor::interface("InterfaceRest")
        .annotate(Annotation::path("interface"))
        .annotate(Annotation::produces(["application/json"]))
        .method(
            MethodDescriptor::new("echo")
                .annotate(Annotation::Get)
                .annotate(Annotation::path("echo"))
                .param(ParamDescriptor::new(TypeRef::string()).query("name")),
        )
        .method(
            MethodDescriptor::new("find")
                .annotate(Annotation::Get)
                .annotate(Annotation::path("users/{id:[0-9]+}"))
                .param(ParamDescriptor::new(TypeRef::long()).path("id"))
                .param(ParamDescriptor::new(TypeRef::integer()).query("limit")),
        )
        .method(
            MethodDescriptor::new("create")
                .annotate(Annotation::Post)
                .annotate(Annotation::consumes(["application/json"]))
                .param(ParamDescriptor::new(TypeRef::named("User"))),
        )
        .build()
}

/// An implementation below `depth` abstract intermediates.
fn hierarchy(depth: usize) -> Arc<TypeDescriptor> {
    let mut parent: Option<Arc<TypeDescriptor>> = None;
    for level in 0..depth {
        let mut builder = TypeDescriptor::abstract_class(format!("Level{level}"))
            .implements(echo_api());
        if let Some(parent) = parent.take() {
            builder = builder.extends(parent);
        }
        parent = Some(builder.build());
    }

    let mut builder = TypeDescriptor::class("Impl")
        .implements(echo_api())
        .method(MethodDescriptor::new("echo").param(ParamDescriptor::new(TypeRef::string())))
        .method(
            MethodDescriptor::new("find")
                .param(ParamDescriptor::new(TypeRef::long()))
                .param(ParamDescriptor::new(TypeRef::integer())),
        );
    if let Some(parent) = parent {
        builder = builder.extends(parent);
    }
    builder.build()
}

// =============================================================================
// Collection Benchmarks
// =============================================================================

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    for depth in [0usize, 2, 8].iter() {
        let ty = hierarchy(*depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| black_box(collect(&ty).unwrap()))
        });
    }

    group.finish();
}

// =============================================================================
// Binding Benchmarks
// =============================================================================

fn bench_get_arguments(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_arguments");

    let table = collect(&hierarchy(0)).unwrap();
    let config = RestConfig::default();
    let readers = ReaderFactory::new(config.clone());
    let providers = ContextProviderFactory::new(config);
    let beans = BeanFactory::new();

    let cases = [
        ("query", "echo", HttpRequest::get("/interface/echo?name=hello%20world")),
        ("regex_path", "find", HttpRequest::get("/interface/users/42?limit=10")),
        (
            "json_body",
            "create",
            HttpRequest::post("/interface").with_body(r#"{"name":"ann","roles":["admin"]}"#),
        ),
    ];

    for (label, method, request) in cases {
        let entry = table.find_by_name(method).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut request = request.clone();
                black_box(
                    get_arguments(
                        &entry.method,
                        &entry.definition,
                        &mut request,
                        &readers,
                        &providers,
                        &beans,
                    )
                    .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_collect, bench_get_arguments);
criterion_main!(benches);
