//! # 批量执行器
//!
//! 在有界线程池中并行执行同一任务，结果通过单消费者通道回收。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，线程数有上限
//! - 工作线程把 (序号, 结果) 发送到 mpsc 通道，调用线程独自消费
//! - 可选进度条
//! - 单个任务失败不影响其他任务，结果按输入顺序返回
//!
//! ## 依赖关系
//! - 被 `commands/xrd.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条（仅在需要时）
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, XrdError};

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::sync::mpsc;

/// 批量处理结果
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 按输入顺序排列的结果
    pub results: Vec<Result<T>>,
}

impl<T> BatchResult<T> {
    /// 成功数量
    pub fn success(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// 失败数量
    pub fn failed(&self) -> usize {
        self.results.len() - self.success()
    }

    /// 失败详情 (序号, 错误)
    pub fn failures(&self) -> impl Iterator<Item = (usize, &XrdError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    progress: Option<ProgressBar>,
}

impl BatchRunner {
    /// 创建新的批量执行器，jobs = 0 表示使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理输入列表
    pub fn run<I, T, F>(&self, inputs: &[I], task: F) -> Result<BatchResult<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| XrdError::InvalidArgument(format!("cannot build thread pool: {}", e)))?;

        let (tx, rx) = mpsc::channel::<(usize, Result<T>)>();

        let mut slots: Vec<Option<Result<T>>> = std::iter::repeat_with(|| None)
            .take(inputs.len())
            .collect();

        std::thread::scope(|scope| {
            let task = &task;
            let pool = &pool;
            scope.spawn(move || {
                pool.install(|| {
                    inputs
                        .par_iter()
                        .enumerate()
                        .for_each_with(tx, |tx, (i, input)| {
                            // 接收端只在全部结果到达后才会关闭
                            let _ = tx.send((i, task(input)));
                        });
                });
            });

            for (i, result) in rx {
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                slots[i] = Some(result);
            }
        });

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        log::debug!("batch of {} tasks finished on {} threads", inputs.len(), self.jobs);

        Ok(BatchResult {
            results: slots.into_iter().flatten().collect(),
        })
    }
}
