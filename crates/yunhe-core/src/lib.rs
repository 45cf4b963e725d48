//! 云合管理控制台核心库（模块注册与路由编排）。
//!
//! 功能：
//! - 定义业务模块清单（module-manifest JSON）数据模型
//! - 候选清单的校验/去重/排序与启用选择（模块注册表）
//! - 路由树编排：布局路由/独立路由拼接、兼容重定向与活跃路径合并
//!
//! 约定：
//! - 本库不执行任何 IO；候选清单由外部加载器（portalctl 等）一次性物化后传入
//! - 坏数据一律降级为“模块缺席 + 日志诊断”，不会向调用方抛出异常
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

pub mod manifest;
pub mod registry;
pub mod routes;
pub mod selection;
