//! The Graph Serializer (§4.8, §6): emits the resolved graph as a stable
//! JSON document.
//!
//! `serde_json::Value`'s default `Map` is a `BTreeMap`, so object keys are
//! emitted in sorted order — deterministic and therefore idempotent (§8
//! P6) even though it doesn't reproduce the illustrative field order in
//! `spec.md`; JSON object key order carries no meaning the driver depends
//! on (only array order does, and every array below is built in the
//! required insertion/BFS order).

use serde_json::{json, Value};

use crate::cache::ModuleDependencyCache;
use crate::model::{ModuleDetails, ModuleId, ModuleKind};

fn kind_tag(kind: ModuleKind) -> &'static str {
    match kind {
        ModuleKind::AtlasInterface | ModuleKind::AtlasSource => "atlasTextual",
        ModuleKind::AtlasBinary => "atlasBinary",
        ModuleKind::AtlasPlaceholder => "atlasPlaceholder",
        ModuleKind::Native => "native",
    }
}

fn details_tag(kind: ModuleKind) -> &'static str {
    match kind {
        ModuleKind::AtlasInterface | ModuleKind::AtlasSource => "atlas",
        ModuleKind::AtlasBinary => "atlasPrebuiltExternal",
        ModuleKind::AtlasPlaceholder => "atlasPlaceholder",
        ModuleKind::Native => "native",
    }
}

fn encode_id(id: &ModuleId) -> Value {
    json!({ kind_tag(id.kind): id.name })
}

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

fn build_details(id: &ModuleId, cache: &ModuleDependencyCache) -> Value {
    let info = cache.find(id);
    let details = info.map(|i| &i.details);
    match details {
        Some(ModuleDetails::AtlasInterface(d)) => {
            let mut obj = serde_json::Map::new();
            if !d.interface_path.as_os_str().is_empty() {
                obj.insert(
                    "moduleInterfacePath".into(),
                    Value::String(path_str(&d.interface_path)),
                );
                obj.insert("contextHash".into(), Value::String(d.context_hash.clone()));
                obj.insert(
                    "commandLine".into(),
                    Value::Array(d.command_line.iter().cloned().map(Value::String).collect()),
                );
                obj.insert(
                    "compiledModuleCandidates".into(),
                    Value::Array(
                        d.compiled_module_candidates
                            .iter()
                            .map(|p| Value::String(path_str(p)))
                            .collect(),
                    ),
                );
            }
            obj.insert("isFramework".into(), Value::Bool(d.is_framework));
            if !d.extra_pcm_args.is_empty() {
                obj.insert(
                    "extraPcmArgs".into(),
                    Value::Array(d.extra_pcm_args.iter().cloned().map(Value::String).collect()),
                );
            }
            if let Some(bh) = &d.bridging_header {
                obj.insert(
                    "bridgingHeader".into(),
                    json!({
                        "path": path_str(&bh.path),
                        "sourceFiles": bh.source_files.iter().map(|p| path_str(p)).collect::<Vec<_>>(),
                        "moduleDependencies": bh.module_dependencies,
                    }),
                );
            }
            json!({ details_tag(id.kind): Value::Object(obj) })
        }
        Some(ModuleDetails::AtlasSource(d)) => {
            let mut obj = serde_json::Map::new();
            obj.insert("isFramework".into(), Value::Bool(false));
            if !d.extra_pcm_args.is_empty() {
                obj.insert(
                    "extraPcmArgs".into(),
                    Value::Array(d.extra_pcm_args.iter().cloned().map(Value::String).collect()),
                );
            }
            if let Some(bh) = &d.bridging_header {
                obj.insert(
                    "bridgingHeader".into(),
                    json!({
                        "path": path_str(&bh.path),
                        "sourceFiles": bh.source_files.iter().map(|p| path_str(p)).collect::<Vec<_>>(),
                        "moduleDependencies": bh.module_dependencies,
                    }),
                );
            }
            json!({ details_tag(id.kind): Value::Object(obj) })
        }
        Some(ModuleDetails::AtlasBinary(d)) => {
            let mut obj = serde_json::Map::new();
            obj.insert(
                "compiledModulePath".into(),
                Value::String(path_str(&d.compiled_module_path)),
            );
            if let Some(p) = &d.module_doc_path {
                obj.insert("moduleDocPath".into(), Value::String(path_str(p)));
            }
            if let Some(p) = &d.module_source_info_path {
                obj.insert("moduleSourceInfoPath".into(), Value::String(path_str(p)));
            }
            obj.insert("isFramework".into(), Value::Bool(d.is_framework));
            json!({ details_tag(id.kind): Value::Object(obj) })
        }
        Some(ModuleDetails::AtlasPlaceholder(d)) => {
            let mut obj = serde_json::Map::new();
            if let Some(p) = &d.module_doc_path {
                obj.insert("moduleDocPath".into(), Value::String(path_str(p)));
            }
            if let Some(p) = &d.module_source_info_path {
                obj.insert("moduleSourceInfoPath".into(), Value::String(path_str(p)));
            }
            json!({ details_tag(id.kind): Value::Object(obj) })
        }
        Some(ModuleDetails::Native(d)) => {
            json!({ details_tag(id.kind): {
                "moduleMapPath": path_str(&d.module_map_path),
                "contextHash": d.context_hash,
                "commandLine": d.command_line,
                "capturedPCMArgs": d.captured_pcm_args,
            }})
        }
        None => Value::Null,
    }
}

/// Builds the full-scan JSON document (§6 "Output JSON schema").
/// `module_order` must place the root first and follow BFS/overlay
/// discovery order (§8 P4); the sentinel overlay-resolution root must
/// already have been excluded by the caller.
pub fn build_graph_json(
    main_module_name: &str,
    module_order: &[ModuleId],
    cache: &ModuleDependencyCache,
) -> Value {
    let mut modules: Vec<Value> = Vec::with_capacity(module_order.len() * 2);
    for id in module_order {
        let info = cache.find(id);
        let module_path = info
            .map(|i| path_str(&i.module_path(&id.name)))
            .unwrap_or_else(|| format!("{}.{}", id.name, id.kind.chain_extension()));
        let direct_dependencies: Vec<Value> = info
            .map(|i| i.common.resolved_dependencies.iter().map(encode_id).collect())
            .unwrap_or_default();
        let source_files = info.and_then(|i| i.source_files()).map(|files| {
            Value::Array(files.iter().map(|p| Value::String(path_str(p))).collect())
        });

        let mut body = serde_json::Map::new();
        body.insert("modulePath".into(), Value::String(module_path));
        if let Some(sf) = source_files {
            body.insert("sourceFiles".into(), sf);
        }
        body.insert("directDependencies".into(), Value::Array(direct_dependencies));
        body.insert("details".into(), build_details(id, cache));

        // The id-object and detail-object are sibling elements of the flat
        // `modules` array (§6), not a nested pair.
        modules.push(encode_id(id));
        modules.push(Value::Object(body));
    }

    json!({
        "mainModuleName": main_module_name,
        "modules": modules,
    })
}

/// Builds the prescan JSON document (§6): just the root's direct
/// `moduleImports`.
pub fn build_prescan_json(imports: &[String]) -> Value {
    json!({ "imports": imports })
}

pub fn to_pretty_string(value: &Value) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
