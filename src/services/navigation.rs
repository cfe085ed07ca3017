//! 可导航 URL 状态
//!
//! 列表加载成功后把分页状态写入 URL，便于分享、收藏和前进后退

use parking_lot::Mutex;
use url::Url;

/// 路由导航
pub trait Navigator: Send + Sync {
    /// 导航到 `path`，附带查询参数
    fn navigate(&self, path: &str, query: &[(&str, String)]);
}

/// 基于 URL 历史的导航实现
pub struct UrlNavigator {
    base: Url,
    history: Mutex<Vec<Url>>,
    /// 当前位置在历史中的下标
    cursor: Mutex<Option<usize>>,
}

impl UrlNavigator {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            history: Mutex::new(Vec::new()),
            cursor: Mutex::new(None),
        }
    }

    /// 当前 URL
    pub fn current(&self) -> Option<Url> {
        let cursor = *self.cursor.lock();
        cursor.and_then(|i| self.history.lock().get(i).cloned())
    }

    /// 后退一步，返回新的当前 URL
    pub fn back(&self) -> Option<Url> {
        let mut cursor = self.cursor.lock();
        match *cursor {
            Some(i) if i > 0 => {
                *cursor = Some(i - 1);
                self.history.lock().get(i - 1).cloned()
            }
            _ => None,
        }
    }

    /// 前进一步，返回新的当前 URL
    pub fn forward(&self) -> Option<Url> {
        let mut cursor = self.cursor.lock();
        let history = self.history.lock();
        match *cursor {
            Some(i) if i + 1 < history.len() => {
                *cursor = Some(i + 1);
                history.get(i + 1).cloned()
            }
            _ => None,
        }
    }

    fn build(&self, path: &str, query: &[(&str, String)]) -> Option<Url> {
        let mut url = match self.base.join(path.trim_start_matches('/')) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("无法导航到 {}: {}", path, e);
                return None;
            }
        };
        url.set_query(None);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Some(url)
    }
}

impl Navigator for UrlNavigator {
    fn navigate(&self, path: &str, query: &[(&str, String)]) {
        let Some(url) = self.build(path, query) else {
            return;
        };

        let mut cursor = self.cursor.lock();
        let mut history = self.history.lock();
        if (*cursor).and_then(|i| history.get(i)) == Some(&url) {
            return;
        }

        // 新导航丢弃当前位置之后的前进记录
        let keep = (*cursor).map_or(0, |i| i + 1);
        history.truncate(keep);
        history.push(url);
        *cursor = Some(history.len() - 1);
    }
}
