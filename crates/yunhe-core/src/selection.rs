//! 模块启用选择（selection）配置值。
//!
//! 配置形态（JSON）：
//! - 字符串 `"*"`：启用全部已发现模块（按 id 升序）
//! - 字符串数组：按给定顺序启用显式模块列表；空数组表示“按各模块默认值启用”
//!
//! 约束与注意事项：
//! - 其他任何形态（非 `"*"` 的字符串、数字、对象等）均属调用方配置错误，
//!   在反序列化阶段直接报错（快速失败），不会进入注册表流程
//!
//! 作者：云合管理控制台项目组（自动生成）
//! 创建时间：2026-08-23
//! 修改时间：2026-08-23

use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 通配选择的字面值。
pub const SELECTION_WILDCARD: &str = "*";

/// 模块启用选择。
///
/// 语义：
/// - [`ModuleSelection::All`]：全部已发现模块
/// - [`ModuleSelection::Explicit`]：显式 id 列表（空列表 = 按默认值启用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSelection {
    /// 通配：启用全部模块。
    All,
    /// 显式列表：按给定顺序启用；空列表表示使用各模块默认值。
    Explicit(Vec<String>),
}

impl Default for ModuleSelection {
    /// 默认选择为空列表（即“按各模块 `enabledByDefault` 启用”）。
    fn default() -> Self {
        Self::Explicit(Vec::new())
    }
}

/// 反序列化中间形态：字符串或字符串数组。
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Text(String),
    Ids(Vec<String>),
}

impl<'de> Deserialize<'de> for ModuleSelection {
    /// 从配置值反序列化。
    ///
    /// 异常处理：
    /// - 非 `"*"` 的字符串、或既非字符串也非字符串数组的值，返回反序列化错误。
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSelection::deserialize(deserializer)
            .map_err(|_| D::Error::custom("模块选择必须是 \"*\" 或字符串数组"))?
        {
            RawSelection::Text(s) if s == SELECTION_WILDCARD => Ok(Self::All),
            RawSelection::Text(s) => Err(D::Error::custom(format!(
                "非法的模块选择字符串: {s:?}（仅支持 \"*\"）"
            ))),
            RawSelection::Ids(ids) => Ok(Self::Explicit(ids)),
        }
    }
}

impl Serialize for ModuleSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str(SELECTION_WILDCARD),
            Self::Explicit(ids) => ids.serialize(serializer),
        }
    }
}

impl FromStr for ModuleSelection {
    type Err = std::convert::Infallible;

    /// 从命令行文本解析选择。
    ///
    /// 规则：
    /// - `"*"`：通配
    /// - 其他：按英文逗号分隔的 id 列表（空白会被去除，空段被忽略）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == SELECTION_WILDCARD {
            return Ok(Self::All);
        }
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self::Explicit(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 验证 `"*"` 反序列化为通配选择。
    fn selection_serde_wildcard() {
        let v: ModuleSelection = serde_json::from_str(r#""*""#).unwrap();
        assert_eq!(v, ModuleSelection::All);
    }

    #[test]
    /// 验证字符串数组反序列化为显式列表（保持顺序）。
    fn selection_serde_explicit() {
        let v: ModuleSelection = serde_json::from_str(r#"["c", "a"]"#).unwrap();
        assert_eq!(
            v,
            ModuleSelection::Explicit(vec!["c".to_string(), "a".to_string()])
        );
    }

    #[test]
    /// 验证非法形态（非通配字符串/数字）在反序列化阶段快速失败。
    fn selection_serde_rejects_malformed() {
        assert!(serde_json::from_str::<ModuleSelection>(r#""all""#).is_err());
        assert!(serde_json::from_str::<ModuleSelection>("42").is_err());
        assert!(serde_json::from_str::<ModuleSelection>(r#"{"ids": []}"#).is_err());
    }

    #[test]
    /// 验证命令行文本解析（逗号分隔、空段忽略）。
    fn selection_from_str() {
        assert_eq!("*".parse::<ModuleSelection>().unwrap(), ModuleSelection::All);
        assert_eq!(
            "c, a,,".parse::<ModuleSelection>().unwrap(),
            ModuleSelection::Explicit(vec!["c".to_string(), "a".to_string()])
        );
        assert_eq!(
            "".parse::<ModuleSelection>().unwrap(),
            ModuleSelection::Explicit(Vec::new())
        );
    }
}
