//! Full round trips through the in-memory queue: proxy on one side, a
//! running node on the other.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use fedlink::chain::{Chain, Next};
use fedlink::codec;
use fedlink::context::Context;
use fedlink::error::{Error, Result};
use fedlink::proxy::NodeProxy;
use fedlink::queue::InMemoryQueue;
use fedlink::runner::NodeRunner;
use fedlink::types::{
    CallType, ConfigsRecord, EvaluateIns, EvaluateRes, FitIns, FitRes, GetParametersIns,
    GetPropertiesIns, Message, Parameters, Scalar, Status,
};

const NODE_ID: u64 = 21;
const RUN_ID: u64 = 3;

/// A node that trains by appending one tensor and evaluates with a
/// fixed loss.
fn training_handler(message: Message, _: &mut Context) -> Result<Message> {
    let content = match message.metadata.task_type {
        CallType::Fit => {
            let ins = codec::content_to_fit_ins(&message.content)?;
            let mut tensors = ins.parameters.tensors;
            tensors.push(vec![9, 9]);
            let res = FitRes {
                status: Status::ok(),
                parameters: Parameters::new(tensors, ins.parameters.tensor_type),
                num_examples: 64,
                metrics: ins.config,
            };
            codec::fit_res_to_content(&res)
        }
        CallType::Evaluate => {
            let ins = codec::content_to_evaluate_ins(&message.content)?;
            let res = EvaluateRes {
                status: Status::ok(),
                loss: 0.125,
                num_examples: ins.parameters.tensors.len() as u64,
                metrics: Default::default(),
            };
            codec::evaluate_res_to_content(&res)
        }
        other => {
            return Err(Error::Handler(format!("unsupported call: {other}")));
        }
    };
    Ok(Message::from_reply(&message, content))
}

fn spawn_node(queue: Arc<InMemoryQueue>, chain: Chain) -> tokio::task::JoinHandle<()> {
    spawn_node_with_id(queue, NODE_ID, chain)
}

fn spawn_node_with_id(
    queue: Arc<InMemoryQueue>,
    node_id: u64,
    chain: Chain,
) -> tokio::task::JoinHandle<()> {
    queue.register_node(node_id);
    let runner = NodeRunner::new(queue, node_id, chain, training_handler)
        .with_poll_interval(Duration::from_millis(5));
    tokio::spawn(async move {
        let _ = runner.run().await;
    })
}

fn proxy(queue: Arc<InMemoryQueue>) -> NodeProxy<InMemoryQueue> {
    NodeProxy::new(queue, NODE_ID, RUN_ID)
        .with_group_id("round-1")
        .with_poll_interval(Duration::from_millis(5))
}

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

#[tokio::test]
async fn fit_round_trip_through_the_queue() {
    let queue = Arc::new(InMemoryQueue::new());
    let node = spawn_node(queue.clone(), Chain::default());
    let proxy = proxy(queue);

    let mut config = fedlink::types::Config::new();
    config.insert("lr".to_string(), Scalar::Float(0.1));
    let ins = FitIns {
        parameters: Parameters::new(vec![vec![1], vec![2]], "np"),
        config: config.clone(),
    };

    let res = proxy.fit(&ins, TIMEOUT).await.unwrap();
    assert!(res.status.is_ok());
    assert_eq!(res.parameters.tensors.len(), 3);
    assert_eq!(res.parameters.tensor_type, "np");
    assert_eq!(res.num_examples, 64);
    assert_eq!(res.metrics, config);

    node.abort();
}

#[tokio::test]
async fn evaluate_round_trip_through_the_queue() {
    let queue = Arc::new(InMemoryQueue::new());
    let node = spawn_node(queue.clone(), Chain::default());
    let proxy = proxy(queue);

    let ins = EvaluateIns {
        parameters: Parameters::new(vec![vec![1], vec![2], vec![3]], "np"),
        config: Default::default(),
    };
    let res = proxy.evaluate(&ins, TIMEOUT).await.unwrap();
    assert_eq!(res.loss, 0.125);
    assert_eq!(res.num_examples, 3);

    node.abort();
}

#[tokio::test]
async fn mods_see_traffic_in_both_directions() {
    let stamp = Chain::boxed(|mut message: Message, cx: &mut Context, next: Next<'_>| {
        message
            .content
            .set_configs("audit:in", ConfigsRecord::new());
        let mut reply = next.run(message, cx)?;
        reply
            .content
            .set_configs("audit:out", ConfigsRecord::new());
        Ok(reply)
    });

    let queue = Arc::new(InMemoryQueue::new());
    let node = spawn_node(queue.clone(), Chain::new(vec![stamp]));
    let proxy = proxy(queue);

    let ins = EvaluateIns {
        parameters: Parameters::new(vec![vec![1]], "np"),
        config: Default::default(),
    };
    let res = proxy.evaluate(&ins, TIMEOUT).await.unwrap();
    assert!(res.status.is_ok());

    node.abort();
}

#[tokio::test]
async fn anonymous_proxy_is_served_by_an_unknown_node() {
    let queue = Arc::new(InMemoryQueue::new());
    let node = spawn_node(queue.clone(), Chain::default());

    // The proxy's node id is never registered; the anonymous
    // instruction is served by whichever node pulls first.
    let proxy = NodeProxy::new(queue, 9999, RUN_ID)
        .with_anonymous()
        .with_poll_interval(Duration::from_millis(5));

    let ins = EvaluateIns {
        parameters: Parameters::new(vec![vec![1]], "np"),
        config: Default::default(),
    };
    let res = proxy.evaluate(&ins, TIMEOUT).await.unwrap();
    assert!(res.status.is_ok());

    node.abort();
}

#[tokio::test]
async fn list_nodes_discovers_running_nodes() {
    use fedlink::queue::TaskQueue;

    let queue = Arc::new(InMemoryQueue::new());
    let node = spawn_node(queue.clone(), Chain::default());

    let nodes = queue.list_nodes().await.unwrap();
    assert_eq!(nodes, vec![NODE_ID]);

    // Discovery feeds proxy construction directly.
    let proxy = NodeProxy::new(queue.clone(), nodes[0], RUN_ID)
        .with_poll_interval(Duration::from_millis(5));
    let ins = EvaluateIns {
        parameters: Parameters::new(vec![vec![1]], "np"),
        config: Default::default(),
    };
    let res = proxy.evaluate(&ins, TIMEOUT).await.unwrap();
    assert!(res.status.is_ok());

    node.abort();
}

#[tokio::test]
async fn distinct_nodes_serve_concurrent_calls() {
    let queue = Arc::new(InMemoryQueue::new());
    let node_a = spawn_node_with_id(queue.clone(), 31, Chain::default());
    let node_b = spawn_node_with_id(queue.clone(), 32, Chain::default());

    let mk_ins = |tensor: u8| FitIns {
        parameters: Parameters::new(vec![vec![tensor]], "np"),
        config: Default::default(),
    };
    let proxy_a = NodeProxy::new(queue.clone(), 31, RUN_ID)
        .with_poll_interval(Duration::from_millis(5));
    let proxy_b = NodeProxy::new(queue, 32, RUN_ID).with_poll_interval(Duration::from_millis(5));

    let (res_a, res_b) = futures::future::try_join(
        proxy_a.fit(&mk_ins(1), TIMEOUT),
        proxy_b.fit(&mk_ins(2), TIMEOUT),
    )
    .await
    .unwrap();

    assert_eq!(res_a.parameters.tensors[0], vec![1]);
    assert_eq!(res_b.parameters.tensors[0], vec![2]);

    node_a.abort();
    node_b.abort();
}

#[tokio::test]
async fn calling_an_unregistered_node_fails_fast() {
    let queue = Arc::new(InMemoryQueue::new());
    let proxy = NodeProxy::new(queue, 99, RUN_ID);

    let err = proxy
        .get_parameters(&GetParametersIns::default(), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownNode(99)));
}

#[tokio::test]
async fn unanswered_call_times_out() {
    let queue = Arc::new(InMemoryQueue::new());
    queue.register_node(NODE_ID); // registered, but no runner is serving it

    let proxy = NodeProxy::new(queue, NODE_ID, RUN_ID)
        .with_poll_interval(Duration::from_millis(5));
    let err = proxy
        .get_properties(&GetPropertiesIns::default(), Some(Duration::from_millis(50)))
        .await
        .unwrap_err();

    match err {
        Error::Timeout { elapsed, .. } => {
            assert!(elapsed >= Duration::from_millis(50));
        }
        other => panic!("expected Timeout, got: {other}"),
    }
}
