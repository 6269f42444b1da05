//! Proxy behavior against a scripted queue: matching, timeouts, and
//! poll discipline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use fedlink::codec;
use fedlink::error::{Error, Result};
use fedlink::proxy::NodeProxy;
use fedlink::queue::TaskQueue;
use fedlink::types::{
    CallType, Content, EvaluateIns, EvaluateRes, FitIns, FitRes, GetParametersIns,
    GetParametersRes, GetPropertiesIns, GetPropertiesRes, Parameters, Status, TaskIns, TaskRes,
};

const TASK_ID: &str = "task-under-test";
const RUN_ID: u64 = 7;

/// Hands out a fixed task id on push and replays scripted poll batches,
/// serving an empty batch once the script runs dry.
struct ScriptedQueue {
    batches: Mutex<VecDeque<Vec<TaskRes>>>,
    polls: AtomicUsize,
    reject_push: bool,
}

impl ScriptedQueue {
    fn new(batches: Vec<Vec<TaskRes>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into()),
            polls: AtomicUsize::new(0),
            reject_push: false,
        })
    }

    fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(VecDeque::new()),
            polls: AtomicUsize::new(0),
            reject_push: true,
        })
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskQueue for ScriptedQueue {
    async fn push_task_ins(&self, node_id: u64, _task_ins: TaskIns) -> Result<String> {
        if self.reject_push {
            return Err(Error::UnknownNode(node_id));
        }
        Ok(TASK_ID.to_string())
    }

    async fn pull_task_res(&self, _task_ids: &[String]) -> Result<Vec<TaskRes>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.batches.lock().pop_front().unwrap_or_default())
    }

    async fn list_nodes(&self) -> Result<Vec<u64>> {
        Ok(vec![1])
    }
}

fn result(reply_to: &str, run_id: u64, task_type: CallType, content: Content) -> TaskRes {
    TaskRes {
        task_id: "res-1".to_string(),
        reply_to: reply_to.to_string(),
        group_id: String::new(),
        run_id,
        task_type,
        created_at: Utc::now(),
        content,
    }
}

fn parameters() -> Parameters {
    Parameters::new(vec![vec![1, 2, 3]], "np")
}

#[tokio::test]
async fn each_call_type_decodes_its_result() {
    let properties_res = GetPropertiesRes {
        status: Status::ok(),
        properties: Default::default(),
    };
    let queue = ScriptedQueue::new(vec![vec![result(
        TASK_ID,
        RUN_ID,
        CallType::GetProperties,
        codec::get_properties_res_to_content(&properties_res),
    )]]);
    let proxy = NodeProxy::new(queue.clone(), 1, RUN_ID);
    let res = proxy
        .get_properties(&GetPropertiesIns::default(), None)
        .await
        .unwrap();
    assert_eq!(res, properties_res);
    assert_eq!(queue.polls(), 1);

    let parameters_res = GetParametersRes {
        status: Status::ok(),
        parameters: parameters(),
    };
    let queue = ScriptedQueue::new(vec![vec![result(
        TASK_ID,
        RUN_ID,
        CallType::GetParameters,
        codec::get_parameters_res_to_content(&parameters_res),
    )]]);
    let proxy = NodeProxy::new(queue, 1, RUN_ID);
    let res = proxy
        .get_parameters(&GetParametersIns::default(), None)
        .await
        .unwrap();
    assert_eq!(res, parameters_res);

    let fit_res = FitRes {
        status: Status::ok(),
        parameters: parameters(),
        num_examples: 32,
        metrics: Default::default(),
    };
    let queue = ScriptedQueue::new(vec![vec![result(
        TASK_ID,
        RUN_ID,
        CallType::Fit,
        codec::fit_res_to_content(&fit_res),
    )]]);
    let proxy = NodeProxy::new(queue, 1, RUN_ID);
    let ins = FitIns {
        parameters: parameters(),
        config: Default::default(),
    };
    assert_eq!(proxy.fit(&ins, None).await.unwrap(), fit_res);

    let evaluate_res = EvaluateRes {
        status: Status::ok(),
        loss: 0.5,
        num_examples: 16,
        metrics: Default::default(),
    };
    let queue = ScriptedQueue::new(vec![vec![result(
        TASK_ID,
        RUN_ID,
        CallType::Evaluate,
        codec::evaluate_res_to_content(&evaluate_res),
    )]]);
    let proxy = NodeProxy::new(queue, 1, RUN_ID);
    let ins = EvaluateIns {
        parameters: parameters(),
        config: Default::default(),
    };
    assert_eq!(proxy.evaluate(&ins, None).await.unwrap(), evaluate_res);
}

#[tokio::test(start_paused = true)]
async fn stale_results_are_ignored_until_a_match_arrives() {
    let res_content = codec::get_properties_res_to_content(&GetPropertiesRes {
        status: Status::ok(),
        properties: Default::default(),
    });

    // First poll: a result for another task and one for another run.
    // Second poll: the real answer.
    let queue = ScriptedQueue::new(vec![
        vec![
            result("someone-else", RUN_ID, CallType::GetProperties, res_content.clone()),
            result(TASK_ID, RUN_ID + 1, CallType::GetProperties, res_content.clone()),
        ],
        vec![result(TASK_ID, RUN_ID, CallType::GetProperties, res_content)],
    ]);

    let proxy = NodeProxy::new(queue.clone(), 1, RUN_ID);
    let res = proxy
        .get_properties(&GetPropertiesIns::default(), Some(Duration::from_secs(5)))
        .await
        .unwrap();
    assert!(res.status.is_ok());
    assert_eq!(queue.polls(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_reported_at_the_deadline_and_polling_stops() {
    let queue = ScriptedQueue::new(vec![]);
    let proxy = NodeProxy::new(queue.clone(), 1, RUN_ID);

    let limit = Duration::from_millis(1200);
    let err = proxy
        .get_properties(&GetPropertiesIns::default(), Some(limit))
        .await
        .unwrap_err();

    match err {
        Error::Timeout { task_id, elapsed } => {
            assert_eq!(task_id, TASK_ID);
            assert!(elapsed >= limit, "elapsed {elapsed:?} < limit {limit:?}");
        }
        other => panic!("expected Timeout, got: {other}"),
    }

    // Polls at 0 ms, 500 ms, 1000 ms, and a final one at the deadline.
    let polls_at_failure = queue.polls();
    assert_eq!(polls_at_failure, 4);

    // The error is terminal; nothing polls afterwards.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(queue.polls(), polls_at_failure);
}

#[tokio::test(start_paused = true)]
async fn zero_timeout_still_polls_once() {
    let res_content = codec::get_properties_res_to_content(&GetPropertiesRes {
        status: Status::ok(),
        properties: Default::default(),
    });
    let queue = ScriptedQueue::new(vec![vec![result(
        TASK_ID,
        RUN_ID,
        CallType::GetProperties,
        res_content,
    )]]);
    let proxy = NodeProxy::new(queue.clone(), 1, RUN_ID);

    // A result that is already waiting is delivered despite the zero
    // timeout.
    let res = proxy
        .get_properties(&GetPropertiesIns::default(), Some(Duration::ZERO))
        .await
        .unwrap();
    assert!(res.status.is_ok());
    assert_eq!(queue.polls(), 1);

    // With nothing waiting, the single poll fails immediately.
    let empty = ScriptedQueue::new(vec![]);
    let proxy = NodeProxy::new(empty.clone(), 1, RUN_ID);
    let err = proxy
        .get_properties(&GetPropertiesIns::default(), Some(Duration::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert_eq!(empty.polls(), 1);
}

#[tokio::test]
async fn push_failure_aborts_the_call() {
    let queue = ScriptedQueue::rejecting();
    let proxy = NodeProxy::new(queue.clone(), 9, RUN_ID);
    let err = proxy
        .get_properties(&GetPropertiesIns::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownNode(9)));
    assert_eq!(queue.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn custom_poll_interval_is_honored() {
    let queue = ScriptedQueue::new(vec![]);
    let proxy = NodeProxy::new(queue.clone(), 1, RUN_ID)
        .with_poll_interval(Duration::from_millis(100));

    let err = proxy
        .get_properties(&GetPropertiesIns::default(), Some(Duration::from_millis(250)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));

    // Polls at 0, 100, 200, and 250 ms.
    assert_eq!(queue.polls(), 4);
}
