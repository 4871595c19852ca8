// 电影目录浏览库
//
// 本库提供电影目录浏览的核心功能，包括：
// - 目录接口客户端与响应缓存
// - 筛选、分页与无限滚动状态
// - 收藏夹与搜索历史的本地持久化
// - 终端前端

pub mod cli;
pub mod config;
pub mod external;
pub mod models;
pub mod services;
pub mod storage;
