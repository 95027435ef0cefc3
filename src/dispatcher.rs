//! 请求调度。
//!
//! 调用方提交的一批请求在一个后台任务中按提交顺序依次处理：
//! 需要用户身份时先解析一次身份，然后逐个拼接，最后把整批请求连同完成的 ID 一起报告给调用方。
//! 单个请求失败只会让它自己没有结果，不影响同批的其他请求。

use std::{sync::Arc, time::Instant};

use dashmap::DashMap;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, instrument, warn};

use crate::{
    config::HatchetConfig,
    error::Result,
    hatchet::{HatchetClient, convert::apply_to_target, stitcher::ResponseStitcher},
    identity::{CredentialStore, UserIdentityResolver},
    model::request::{FillTarget, InfoRequest, RequestId, RequestState},
};

/// 一批请求处理完成后的报告。
#[derive(Debug)]
pub struct BatchReport {
    /// 已处理完毕的请求 ID，按提交顺序排列，成功与失败的请求都在其中。
    pub done: Vec<RequestId>,
    /// 处理后的请求，结果或错误已写入。
    pub requests: Vec<InfoRequest>,
}

impl BatchReport {
    /// 成功拿到结果的请求 ID。
    pub fn succeeded(&self) -> Vec<&RequestId> {
        self.requests
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| r.id())
            .collect()
    }
}

/// 请求调度器。
///
/// 所有状态都在 `Arc` 之后，克隆得到的调度器共享同一个补全登记表和报告通道。
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    stitcher: Arc<ResponseStitcher>,
    identity: Arc<UserIdentityResolver>,
    pending_fills: Arc<DashMap<RequestId, FillTarget>>,
    reports: mpsc::UnboundedSender<BatchReport>,
}

impl RequestDispatcher {
    /// 创建调度器，同时返回接收批次报告的一端。
    pub fn new(
        stitcher: Arc<ResponseStitcher>,
        identity: Arc<UserIdentityResolver>,
    ) -> (Self, mpsc::UnboundedReceiver<BatchReport>) {
        let (reports, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            stitcher,
            identity,
            pending_fills: Arc::new(DashMap::new()),
            reports,
        };
        (dispatcher, receiver)
    }

    /// 根据配置创建使用 `reqwest` 传输层的调度器。
    pub fn from_config(
        config: &HatchetConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<BatchReport>)> {
        let client = Arc::new(HatchetClient::new(config)?);
        let stitcher = Arc::new(ResponseStitcher::new(
            client.clone(),
            config.min_search_score,
        ));
        let identity = Arc::new(UserIdentityResolver::new(
            client,
            store,
            config.authenticator_name.as_str(),
        ));
        Ok(Self::new(stitcher, identity))
    }

    /// 调度器使用的身份解析器。
    pub fn identity(&self) -> &Arc<UserIdentityResolver> {
        &self.identity
    }

    /// 为请求登记一个补全目标，请求完成后会用结果补全它。
    ///
    /// 登记项只在同 ID 的请求被调度器处理时移除。
    /// 登记后不打算提交的请求需要用 [`Self::unregister_fill_target`] 撤销。
    pub fn register_fill_target(&self, id: RequestId, target: FillTarget) {
        self.pending_fills.insert(id, target);
    }

    /// 撤销一个尚未处理的补全目标，返回被撤销的目标。
    pub fn unregister_fill_target(&self, id: &RequestId) -> Option<FillTarget> {
        self.pending_fills.remove(id).map(|(_, target)| target)
    }

    /// 尚未完成的补全目标数量。
    pub fn pending_fill_count(&self) -> usize {
        self.pending_fills.len()
    }

    /// 提交单个请求。
    ///
    /// # Panics
    ///
    /// 与 [`Self::submit_batch`] 相同，必须在 Tokio 运行时中调用。
    pub fn submit(&self, request: InfoRequest) -> JoinHandle<()> {
        self.submit_batch(vec![request])
    }

    /// 提交单个请求，并为其登记补全目标。
    ///
    /// # Panics
    ///
    /// 与 [`Self::submit_batch`] 相同，必须在 Tokio 运行时中调用。
    pub fn submit_with_target(&self, request: InfoRequest, target: FillTarget) -> JoinHandle<()> {
        self.register_fill_target(request.id().clone(), target);
        self.submit(request)
    }

    /// 在后台任务中处理一批请求，完成后通过报告通道通知调用方。
    ///
    /// 立即返回，不等待请求完成。
    ///
    /// # Panics
    ///
    /// 后台任务由 [`tokio::spawn`] 创建，在 Tokio 运行时之外调用会 panic。
    /// 没有运行时的调用方可以自行驱动 [`Self::process_batch`]。
    pub fn submit_batch(&self, requests: Vec<InfoRequest>) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let report = dispatcher.process_batch(requests).await;
            if dispatcher.reports.send(report).is_err() {
                debug!("报告接收端已关闭，丢弃本批次报告。");
            }
        })
    }

    /// 处理一批请求并返回报告。
    ///
    /// 批内有请求需要用户身份时，在处理第一个请求前解析一次身份。
    #[instrument(skip_all, fields(batch_size = requests.len()))]
    pub async fn process_batch(&self, mut requests: Vec<InfoRequest>) -> BatchReport {
        let start = Instant::now();

        let needs_identity = requests
            .iter()
            .any(|r| r.kind().needs_user_scope(r.params()));
        let user_id = if needs_identity {
            for request in requests
                .iter_mut()
                .filter(|r| r.kind().needs_user_scope(r.params()))
            {
                request.state = RequestState::ResolvingIdentity;
            }
            self.identity.get_or_resolve().await
        } else {
            None
        };

        let mut done = Vec::with_capacity(requests.len());
        for request in &mut requests {
            request.state = RequestState::Fetching;
            debug!(request = %request.id(), kind = %request.kind(), "开始处理请求");
            match self
                .stitcher
                .stitch(request.kind(), request.params(), user_id.as_deref())
                .await
            {
                Ok(result) => {
                    request.result = Some(result);
                    request.state = RequestState::Stitched;
                }
                Err(e) => {
                    warn!("请求 {} ({}) 失败: {}", request.id(), request.kind(), e);
                    request.error = Some(e);
                    request.state = RequestState::Failed;
                }
            }

            if let Some((_, target)) = self.pending_fills.remove(request.id())
                && let Some(result) = request.result()
            {
                apply_to_target(result, &target);
            }

            request.state = RequestState::Reported;
            done.push(request.id().clone());
        }

        debug!(
            "批次处理完成：{} 个请求，{} 个成功，耗时 {}ms",
            done.len(),
            requests.iter().filter(|r| r.succeeded()).count(),
            start.elapsed().as_millis()
        );
        BatchReport { done, requests }
    }
}
