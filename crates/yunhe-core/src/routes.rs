//! 路由树编排：将启用模块的路由载荷合并为外部路由组件的输入。
//!
//! 编排内容：
//! - 布局路由：按模块顺序拼接（模块内顺序不变），挂载在共享应用壳下
//! - 独立路由：同样拼接为独立的顶层路由列表（绕过应用壳）
//! - 兼容重定向表：按 `from` 去重合并，先注册者生效
//! - 活跃路径映射：按新路径去重合并，先注册者生效
//!
//! 约定：
//! - 路由定义对象完全透传，本模块不解释其内容
//! - 重定向/活跃路径的键冲突保持“先到先得”语义，同时记录 warn 便于排查
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::manifest::{ModuleManifest, RouteAlias};

/// 日志诊断中使用的组件标签。
const COMPONENT: &str = "route-composer";

/// 编排结果：外部路由组件消费的全部路由材料。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedRoutes {
    /// 布局路由（应用壳内），模块顺序 × 模块内顺序均保持。
    pub layout: Vec<serde_json::Value>,
    /// 独立路由（应用壳外）。
    pub standalone: Vec<serde_json::Value>,
    /// 全局重定向表（`from` 唯一，先注册者生效）。
    pub route_aliases: Vec<RouteAlias>,
    /// 全局活跃路径映射：新路径 -> 旧路径（先注册者生效）。
    pub active_path_map: BTreeMap<String, String>,
}

/// 按给定模块顺序编排路由树。
///
/// 参数：
/// - `modules`：启用模块列表（顺序即挂载顺序，通常来自
///   [`crate::registry::ModuleRegistry::enabled_modules`]）
///
/// 返回值：
/// - [`ComposedRoutes`]；输入模块不被修改，结果为全新分配
///
/// 异常处理：
/// - 重定向 `from` 或活跃路径键冲突时保留先注册者并记录 warn，不报错
pub fn compose_routes(modules: &[ModuleManifest]) -> ComposedRoutes {
    let mut composed = ComposedRoutes::default();
    let mut alias_froms: HashSet<&str> = HashSet::new();

    for module in modules {
        composed.layout.extend(module.routes.layout.iter().cloned());
        if let Some(standalone) = &module.routes.standalone {
            composed.standalone.extend(standalone.iter().cloned());
        }

        let Some(compat) = &module.compat else {
            continue;
        };
        for alias in &compat.route_aliases {
            if !alias_froms.insert(alias.from.as_str()) {
                warn!(
                    "{COMPONENT}: 模块 {} 的重定向 from={} 与先注册者冲突，已忽略",
                    module.id, alias.from
                );
                continue;
            }
            composed.route_aliases.push(alias.clone());
        }
        for (new_path, legacy_path) in &compat.active_path_map {
            if composed.active_path_map.contains_key(new_path) {
                warn!(
                    "{COMPONENT}: 模块 {} 的活跃路径 {} 与先注册者冲突，已忽略",
                    module.id, new_path
                );
                continue;
            }
            composed
                .active_path_map
                .insert(new_path.clone(), legacy_path.clone());
        }
    }
    composed
}
