use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Barrier};

use agent_teams::model::DEFAULT_MESSAGE_TYPE;
use agent_teams::{Config, Coordinator, TeamsError};
use tempfile::tempdir;

fn coordinator(root: &Path) -> Coordinator {
    Coordinator::new(Config::new(root))
}

fn members(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn concurrent_senders_lose_no_messages() {
    let dir = tempdir().unwrap();
    let root: Arc<PathBuf> = Arc::new(dir.path().to_path_buf());
    coordinator(&root)
        .create_team("t", &members(&["s0", "s1", "s2", "s3", "inbox"]))
        .unwrap();

    let senders = 4;
    let per_sender = 20;
    let barrier = Arc::new(Barrier::new(senders));
    let handles: Vec<_> = (0..senders)
        .map(|s| {
            let root = Arc::clone(&root);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let c = coordinator(&root);
                barrier.wait();
                for i in 0..per_sender {
                    c.send(&format!("s{s}@t"), "inbox@t", &format!("{s}-{i}"), DEFAULT_MESSAGE_TYPE)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let all = coordinator(&root).read_inbox("inbox@t").unwrap();
    assert_eq!(all.len(), senders * per_sender);

    // Per-sender order is preserved in the log.
    for s in 0..senders {
        let seq: Vec<String> = all
            .iter()
            .filter(|m| m.from == format!("s{s}"))
            .map(|m| m.text.clone())
            .collect();
        let expected: Vec<String> = (0..per_sender).map(|i| format!("{s}-{i}")).collect();
        assert_eq!(seq, expected);
    }
}

#[test]
fn polling_while_sending_delivers_each_message_exactly_once() {
    let dir = tempdir().unwrap();
    let root: Arc<PathBuf> = Arc::new(dir.path().to_path_buf());
    coordinator(&root).create_team("t", &members(&["a", "b"])).unwrap();

    let total = 60;
    let barrier = Arc::new(Barrier::new(3));

    let sender = {
        let root = Arc::clone(&root);
        let barrier = Arc::clone(&barrier);
        std::thread::spawn(move || {
            let c = coordinator(&root);
            barrier.wait();
            for i in 0..total {
                c.send("a@t", "b@t", &i.to_string(), DEFAULT_MESSAGE_TYPE).unwrap();
            }
        })
    };
    let pollers: Vec<_> = (0..2)
        .map(|_| {
            let root = Arc::clone(&root);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let c = coordinator(&root);
                barrier.wait();
                let mut seen = Vec::new();
                for _ in 0..50 {
                    seen.extend(c.poll("b@t").unwrap().1.into_iter().map(|m| m.text));
                    // Interleaved read-all must not disturb delivery.
                    c.read_inbox("b@t").unwrap();
                }
                seen
            })
        })
        .collect();

    sender.join().unwrap();
    let mut delivered: Vec<String> = pollers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    delivered.extend(
        coordinator(&root)
            .poll("b@t")
            .unwrap()
            .1
            .into_iter()
            .map(|m| m.text),
    );

    assert_eq!(delivered.len(), total);
    let unique: HashSet<&String> = delivered.iter().collect();
    assert_eq!(unique.len(), total);
}

#[test]
fn threaded_claims_have_exactly_one_winner() {
    let dir = tempdir().unwrap();
    let root: Arc<PathBuf> = Arc::new(dir.path().to_path_buf());
    let c = coordinator(&root);
    c.create_team("race", &members(&["a", "b"])).unwrap();
    c.create_task("race", "contested", "", None, None).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|agent| {
            let root = Arc::clone(&root);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let c = coordinator(&root);
                barrier.wait();
                (agent, c.claim_task("race", "1", agent))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<&str> = results
        .iter()
        .filter(|(_, r)| r.is_ok())
        .map(|(agent, _)| *agent)
        .collect();
    assert_eq!(winners.len(), 1);
    assert!(
        results
            .iter()
            .filter(|(_, r)| r.is_err())
            .all(|(_, r)| matches!(r, Err(TeamsError::Conflict { .. })))
    );

    let task = c.get_task("race", "1").unwrap();
    assert_eq!(task.assigned_to.as_deref(), Some(winners[0]));
}

#[test]
fn cross_process_claims_have_exactly_one_winner() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let c = coordinator(root);
    let agents: Vec<String> = (0..6).map(|i| format!("agent-{i}")).collect();
    c.create_team("race", &agents).unwrap();
    c.create_task("race", "contested", "", None, None).unwrap();

    let binary = assert_cmd::cargo::cargo_bin!("agent-teams");
    let children: Vec<_> = agents
        .iter()
        .map(|agent| {
            Command::new(binary)
                .env_remove("AGENT_TEAMS_LOG")
                .env_remove("AGENT_TEAMS_LOCK_TIMEOUT_MS")
                .arg("--root")
                .arg(root)
                .args(["task-claim", "race", "1", agent.as_str()])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .expect("spawn agent-teams")
        })
        .collect();

    let outputs: Vec<_> = children
        .into_iter()
        .map(|child| child.wait_with_output().unwrap())
        .collect();
    let successes: Vec<serde_json::Value> = outputs
        .iter()
        .filter(|o| o.status.success())
        .map(|o| serde_json::from_slice(&o.stdout).unwrap())
        .collect();
    assert_eq!(successes.len(), 1, "exactly one process wins the claim");

    for failed in outputs.iter().filter(|o| !o.status.success()) {
        let stderr = String::from_utf8_lossy(&failed.stderr);
        let err: serde_json::Value =
            serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
        assert_eq!(err["code"], "conflict");
    }

    let task = c.get_task("race", "1").unwrap();
    assert_eq!(
        task.assigned_to.as_deref(),
        successes[0]["assigned_to"].as_str()
    );
}

#[test]
fn cross_process_task_creation_assigns_unique_ids() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    coordinator(root).create_team("ids", &[]).unwrap();

    let binary = assert_cmd::cargo::cargo_bin!("agent-teams");
    let children: Vec<_> = (0..5)
        .map(|i| {
            Command::new(binary)
                .env_remove("AGENT_TEAMS_LOCK_TIMEOUT_MS")
                .arg("--root")
                .arg(root)
                .args(["task-create", "ids", "-s"])
                .arg(format!("task {i}"))
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .expect("spawn agent-teams")
        })
        .collect();
    for child in children {
        assert!(child.wait_with_output().unwrap().status.success());
    }

    let ids: Vec<String> = coordinator(root)
        .list_tasks("ids", None)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}
