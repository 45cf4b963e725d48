//! 模块注册表：候选清单的校验、去重、排序与启用选择。
//!
//! 数据流：
//! - 外部加载器物化候选集（来源标签 + 原始导出 JSON）→ 逐条校验 →
//!   按 id 去重（先到先得）→ 按 id 升序排序 → 按选择配置过滤
//!
//! 约定：
//! - 坏数据（无效清单/重复 id/未知 id）一律降级为“剔除 + warn 日志”，
//!   绝不因单个坏模块阻断其余模块的注册
//! - 每次调用都基于完整候选集重新计算，不做任何跨调用缓存
//!   （开发期热更新候选集时行为保持一致）
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::manifest::{ModuleManifest, MANIFEST_SCHEMA_VERSION};
use crate::selection::ModuleSelection;

/// 日志诊断中使用的组件标签。
const COMPONENT: &str = "module-registry";

/// 单个候选清单：来源标签 + 原始导出值。
///
/// 说明：
/// - `source` 仅用于日志诊断（通常是清单文件名或源单元路径）
/// - `value` 是候选导出的原始 JSON，可能是清单对象本身（默认导出），
///   也可能把清单包裹在 `manifest` 键下（具名备用导出）
#[derive(Debug, Clone)]
pub struct ModuleCandidate {
    /// 来源标签（文件名/源单元路径等）。
    pub source: String,
    /// 原始导出 JSON 值。
    pub value: Value,
}

impl ModuleCandidate {
    /// 创建候选清单。
    pub fn new(source: impl Into<String>, value: Value) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }
}

/// 清单校验错误类型。
///
/// 用途：
/// - 供注册表日志与 portalctl doctor 输出明确的剔除原因。
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("候选导出不是 JSON 对象")]
    NotAnObject,
    #[error("id 缺失或不是非空字符串")]
    MissingId,
    #[error("清单版本不受支持: {0}（仅支持 \"{MANIFEST_SCHEMA_VERSION}\"）")]
    UnsupportedVersion(String),
    #[error("routes.layout 缺失或不是数组")]
    MissingLayoutRoutes,
    #[error("清单字段反序列化失败: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// 解析候选导出：支持默认导出与具名备用导出两种形态。
///
/// 规则：
/// - 候选对象自身带 `id` 时视为清单本体（默认导出）
/// - 否则若存在对象形态的 `manifest` 成员，下钻一层（具名备用导出）
fn resolve_export(value: &Value) -> &Value {
    if value.get("id").is_none() {
        if let Some(inner) = value.get("manifest").filter(|v| v.is_object()) {
            return inner;
        }
    }
    value
}

/// 校验单个候选清单。
///
/// 校验顺序（首个失败即整体拒绝）：
/// 1) 候选导出必须是 JSON 对象
/// 2) `id` 必须是非空字符串
/// 3) `version` 必须精确等于 `"1"`
/// 4) `routes.layout` 必须是数组
/// 5) 其余字段整体反序列化为 [`ModuleManifest`]（如 compat 结构畸形同样拒绝）
///
/// 返回值：
/// - 成功：解析后的 [`ModuleManifest`]
/// - 失败：[`ManifestError`]（由调用方决定记录日志或展示）
pub fn validate_candidate(candidate: &ModuleCandidate) -> Result<ModuleManifest, ManifestError> {
    let value = resolve_export(&candidate.value);
    let obj = value.as_object().ok_or(ManifestError::NotAnObject)?;

    match obj.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {}
        _ => return Err(ManifestError::MissingId),
    }

    let version = obj.get("version");
    if version.and_then(Value::as_str) != Some(MANIFEST_SCHEMA_VERSION) {
        return Err(ManifestError::UnsupportedVersion(
            version.map_or_else(|| "缺失".to_string(), |v| v.to_string()),
        ));
    }

    let layout_is_array = obj
        .get("routes")
        .and_then(|r| r.get("layout"))
        .is_some_and(Value::is_array);
    if !layout_is_array {
        return Err(ManifestError::MissingLayoutRoutes);
    }

    Ok(serde_json::from_value(value.clone())?)
}

/// 模块注册表。
///
/// 说明：
/// - 持有外部加载器物化好的候选集（只读），自身不做发现/IO
/// - 所有查询方法均为候选集的纯函数，可在任意调用点重复调用
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    candidates: Vec<ModuleCandidate>,
}

impl ModuleRegistry {
    /// 以候选集创建注册表（候选顺序即发现顺序，影响重复 id 的先到先得）。
    pub fn new(candidates: Vec<ModuleCandidate>) -> Self {
        Self { candidates }
    }

    /// 注册表持有的原始候选集（供 doctor 等诊断工具复核）。
    pub fn candidates(&self) -> &[ModuleCandidate] {
        &self.candidates
    }

    /// 获取全部有效模块（按 id 升序）。
    ///
    /// 行为：
    /// 1) 按发现顺序逐条校验，无效候选剔除并记录 warn
    /// 2) 按 id 去重：先发现者生效，后续重复剔除并记录 warn
    /// 3) 结果按 id 升序（Unicode 码点序）排序，保证跨平台可复现
    pub fn all_modules(&self) -> Vec<ModuleManifest> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut modules: Vec<ModuleManifest> = Vec::new();
        for candidate in &self.candidates {
            let manifest = match validate_candidate(candidate) {
                Ok(m) => m,
                Err(e) => {
                    warn!("{COMPONENT}: 剔除无效模块清单 {}: {e}", candidate.source);
                    continue;
                }
            };
            if !seen.insert(manifest.id.clone()) {
                warn!(
                    "{COMPONENT}: 剔除重复模块 id={}（来源 {}，保留先发现者）",
                    manifest.id, candidate.source
                );
                continue;
            }
            modules.push(manifest);
        }
        modules.sort_by(|a, b| a.id.cmp(&b.id));
        modules
    }

    /// 获取全部有效模块的 id 列表（按 id 升序，供诊断/工具使用）。
    pub fn module_ids(&self) -> Vec<String> {
        self.all_modules().into_iter().map(|m| m.id).collect()
    }

    /// 按选择配置获取启用模块。
    ///
    /// 规则：
    /// - 通配 `"*"`：等价于 [`ModuleRegistry::all_modules`]
    /// - 空列表：返回 `enabledByDefault == true` 的子集（保持 id 升序相对顺序）
    /// - 非空列表：严格按给定 id 顺序返回；重复 id 仅首次生效并记录 warn，
    ///   未知 id 剔除并记录 warn（不会中断整个选择）
    ///
    /// 保证：
    /// - 结果中不会出现两个相同 id 的清单
    /// - 结果顺序是选择配置与候选集的确定性函数
    pub fn enabled_modules(&self, selection: &ModuleSelection) -> Vec<ModuleManifest> {
        let all = self.all_modules();
        let ids = match selection {
            ModuleSelection::All => return all,
            ModuleSelection::Explicit(ids) if ids.is_empty() => {
                return all.into_iter().filter(|m| m.enabled_by_default).collect();
            }
            ModuleSelection::Explicit(ids) => ids,
        };

        let mut by_id: HashMap<String, ModuleManifest> =
            all.into_iter().map(|m| (m.id.clone(), m)).collect();
        let mut requested: HashSet<&str> = HashSet::new();
        let mut enabled = Vec::with_capacity(ids.len());
        for id in ids {
            if !requested.insert(id.as_str()) {
                warn!("{COMPONENT}: 启用列表中的重复 id={id} 仅首次生效");
                continue;
            }
            match by_id.remove(id.as_str()) {
                Some(m) => enabled.push(m),
                None => warn!("{COMPONENT}: 启用列表中的未知 id={id} 已跳过"),
            }
        }
        enabled
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// 构造一个最小合法清单候选。
    fn candidate(id: &str, enabled_by_default: bool) -> ModuleCandidate {
        ModuleCandidate::new(
            format!("{id}.json"),
            json!({
                "id": id,
                "version": "1",
                "enabledByDefault": enabled_by_default,
                "routes": { "layout": [{ "path": format!("/{id}") }] }
            }),
        )
    }

    /// 谱系场景候选集：b（默认启用）/ a（默认关闭）/ c（默认启用）。
    fn scenario() -> ModuleRegistry {
        ModuleRegistry::new(vec![
            candidate("b", true),
            candidate("a", false),
            candidate("c", true),
        ])
    }

    #[test]
    /// 全量列表按 id 升序，与发现顺序无关。
    fn all_modules_sorted_by_id() {
        let ids = scenario().module_ids();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    /// 重复 id：先发现者生效，后续整体剔除（不合并）。
    fn duplicate_id_first_seen_wins() {
        let mut dup = candidate("b", false);
        dup.value["apiNamespace"] = json!("other");
        dup.source = "b-dup.json".to_string();
        let registry = ModuleRegistry::new(vec![candidate("b", true), dup, candidate("a", true)]);
        let all = registry.all_modules();
        assert_eq!(all.len(), 2);
        let b = all.iter().find(|m| m.id == "b").unwrap();
        assert!(b.enabled_by_default);
        assert!(b.api_namespace.is_empty());
    }

    #[test]
    /// 版本不为 "1" 的候选整体剔除。
    fn unsupported_version_rejected() {
        let mut bad = candidate("d", true);
        bad.value["version"] = json!("2");
        let registry = ModuleRegistry::new(vec![candidate("a", true), bad]);
        assert_eq!(registry.module_ids(), ["a"]);
    }

    #[test]
    /// `routes.layout` 缺失或非数组的候选整体剔除。
    fn missing_layout_routes_rejected() {
        let no_routes = ModuleCandidate::new("x.json", json!({ "id": "x", "version": "1" }));
        let bad_layout = ModuleCandidate::new(
            "y.json",
            json!({ "id": "y", "version": "1", "routes": { "layout": "/y" } }),
        );
        let registry = ModuleRegistry::new(vec![no_routes, bad_layout, candidate("a", true)]);
        assert_eq!(registry.module_ids(), ["a"]);
    }

    #[test]
    /// 非对象候选、空 id、数字版本均被剔除，不中断其余候选。
    fn malformed_candidates_rejected() {
        let registry = ModuleRegistry::new(vec![
            ModuleCandidate::new("null.json", json!(null)),
            ModuleCandidate::new("list.json", json!([1, 2])),
            ModuleCandidate::new("no-id.json", json!({ "version": "1", "routes": { "layout": [] } })),
            ModuleCandidate::new(
                "int-version.json",
                json!({ "id": "z", "version": 1, "routes": { "layout": [] } }),
            ),
            candidate("a", true),
        ]);
        assert_eq!(registry.module_ids(), ["a"]);
    }

    #[test]
    /// compat 结构畸形时整条候选剔除（绝不部分注册）。
    fn malformed_compat_rejects_whole_candidate() {
        let mut bad = candidate("e", true);
        bad.value["compat"] = json!({ "routeAliases": [{ "from": "/old" }] });
        let registry = ModuleRegistry::new(vec![bad, candidate("a", true)]);
        assert_eq!(registry.module_ids(), ["a"]);
    }

    #[test]
    /// 具名备用导出（`manifest` 包裹一层）同样可被解析。
    fn named_alternate_export_resolved() {
        let wrapped = ModuleCandidate::new(
            "wrapped.json",
            json!({ "manifest": { "id": "w", "version": "1", "routes": { "layout": [] } } }),
        );
        let registry = ModuleRegistry::new(vec![wrapped]);
        assert_eq!(registry.module_ids(), ["w"]);
    }

    #[test]
    /// 通配选择等价于全量列表。
    fn enabled_wildcard_equals_all() {
        let registry = scenario();
        assert_eq!(registry.enabled_modules(&ModuleSelection::All), registry.all_modules());
    }

    #[test]
    /// 空选择返回默认启用子集，保持 id 升序相对顺序。
    fn enabled_empty_selection_uses_defaults() {
        let enabled = scenario().enabled_modules(&ModuleSelection::default());
        let ids: Vec<&str> = enabled.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    /// 显式选择严格按给定顺序返回，而非 id 升序。
    fn enabled_explicit_selection_keeps_given_order() {
        let selection = ModuleSelection::Explicit(vec!["c".to_string(), "a".to_string()]);
        let enabled = scenario().enabled_modules(&selection);
        let ids: Vec<&str> = enabled.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["c", "a"]);
    }

    #[test]
    /// 显式选择中的重复 id 仅首次生效。
    fn enabled_explicit_selection_dedups_ids() {
        let selection = ModuleSelection::Explicit(vec!["a".to_string(), "a".to_string()]);
        let enabled = scenario().enabled_modules(&selection);
        let ids: Vec<&str> = enabled.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }

    #[test]
    /// 显式选择中的未知 id 被跳过且不会 panic。
    fn enabled_explicit_selection_skips_unknown_ids() {
        let selection = ModuleSelection::Explicit(vec!["missing-id".to_string()]);
        assert!(scenario().enabled_modules(&selection).is_empty());
    }
}
