//! 业务模块清单（module-manifest.json）数据模型定义。
//!
//! 该模块描述一个可插拔业务模块向控制台声明的全部信息：
//! - 身份信息（`id`、清单格式版本、API 命名空间）
//! - 路由载荷（布局路由/独立路由，内容对注册表完全透传）
//! - 兼容元数据（旧路径重定向、活跃路径归属映射）
//!
//! 约定：
//! - JSON 字段名采用 camelCase（与前端清单格式一致）
//! - 可选字段通过 `#[serde(default)]` 提供默认值，以便清单向前兼容
//! - 该模块仅定义数据结构，不执行任何 IO/校验流程（校验见 [`crate::registry`]）
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 当前支持的清单格式版本（`version` 字段必须精确等于该值）。
pub const MANIFEST_SCHEMA_VERSION: &str = "1";

/// 单个业务模块清单。
///
/// 说明：
/// - `id` 是去重与启用选择的唯一键
/// - `enabled_by_default` 决定“未显式配置启用列表”时模块是否参与
/// - `api_namespace` 仅作分组标签，注册表不做任何校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    /// 模块 ID（唯一）。
    pub id: String,
    /// 清单格式版本（当前仅接受 `"1"`）。
    pub version: String,
    #[serde(default)]
    /// 默认是否启用（无显式启用配置时生效）。
    pub enabled_by_default: bool,
    #[serde(default)]
    /// 后端 API 命名空间标签（自由文本，仅用于分组展示）。
    pub api_namespace: String,
    /// 路由载荷。
    pub routes: ModuleRoutes,
    #[serde(default)]
    /// 向后兼容元数据（可选）。
    pub compat: Option<ModuleCompat>,
}

/// 模块路由载荷。
///
/// 说明：
/// - 路由定义对象对注册表完全不透明（[`serde_json::Value`] 透传），
///   由外部路由组件解释
/// - `layout` 必须存在且为数组（允许为空数组）；缺失或非数组视为无效清单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRoutes {
    /// 布局路由：渲染在主应用壳（导航框架）内。
    pub layout: Vec<serde_json::Value>,
    #[serde(default)]
    /// 独立路由：渲染在应用壳之外（如全屏设计器/预览页）。
    pub standalone: Option<Vec<serde_json::Value>>,
}

/// 模块兼容元数据。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCompat {
    #[serde(default)]
    /// 旧路径重定向对（按声明顺序生效）。
    pub route_aliases: Vec<RouteAlias>,
    #[serde(default)]
    /// 活跃路径映射：新路径 -> 旧路径（用于菜单高亮/权限归属）。
    pub active_path_map: BTreeMap<String, String>,
}

/// 单条路径重定向（旧路径跳转到新路径）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAlias {
    /// 旧路径（重定向来源）。
    pub from: String,
    /// 新路径（重定向目标）。
    pub to: String,
}
