//! Session Queries

/// 获取会话查询
#[derive(Debug, Clone)]
pub struct GetSession {
    pub group: String,
}

/// 列出所有会话查询
#[derive(Debug, Clone)]
pub struct ListSessions;
