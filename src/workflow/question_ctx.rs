//! 题目展示上下文
//!
//! 封装"这是本次会话的第几题，共几题"这一信息

use std::fmt::Display;

/// 题目展示上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCtx {
    /// 当前题目序号（从1开始）
    pub number: usize,

    /// 本次会话的题目总数（已截断到题库大小）
    pub total: usize,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(number: usize, total: usize) -> Self {
        Self { number, total }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[第 {}/{} 题]", self.number, self.total)
    }
}
