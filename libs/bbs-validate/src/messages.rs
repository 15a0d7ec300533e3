//! Fallback messages for checks that carry no override.
#![allow(clippy::non_ascii_literal)]

use crate::rule::Rule;

/// Renders the default failure message for `rule` on `field`.
#[must_use]
pub fn default_message(field: &str, rule: &Rule) -> String {
    match rule {
        Rule::Required => format!("{field} 不能为空"),
        Rule::Between { min, max } => format!("{field} 长度必须介于 {min} - {max} 个字符之间"),
        Rule::MaxLength(max) => format!("{field} 长度不能超过 {max} 个字符"),
        Rule::Pattern(_) => format!("{field} 格式不正确"),
        Rule::Email => format!("{field} 必须是有效的邮箱地址"),
        Rule::Unique { .. } => format!("{field} 已被占用"),
    }
}
