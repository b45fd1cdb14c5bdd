use tempfile::tempdir;

use agent_teams::error::ErrorKind;
use agent_teams::model::{BROADCAST_MESSAGE_TYPE, DEFAULT_MESSAGE_TYPE, TaskStatus};
use agent_teams::output::{PollFormat, render_poll};
use agent_teams::{Config, Coordinator, TeamsError};

fn members(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_full_workflow() {
    let dir = tempdir().unwrap();
    let c = Coordinator::new(Config::new(dir.path()));

    c.create_team("crew", &members(&["lead", "w1", "w2"])).unwrap();

    // Lead hands out work; each assignment lands in the worker's inbox.
    let t1 = c
        .create_task("crew", "write parser", "tokens first", Some("w1"), Some("lead"))
        .unwrap();
    let t2 = c
        .create_task("crew", "write tests", "", Some("w2"), Some("lead"))
        .unwrap();
    let t3 = c.create_task("crew", "unassigned chore", "", None, None).unwrap();
    assert_eq!((t1.id.as_str(), t2.id.as_str(), t3.id.as_str()), ("1", "2", "3"));

    let (_, w1_msgs) = c.poll("w1@crew").unwrap();
    assert_eq!(w1_msgs.len(), 1);
    assert_eq!(w1_msgs[0].msg_type, "task_assignment");

    // Workers claim and finish, then report back.
    c.claim_task("crew", "1", "w1").unwrap();
    c.claim_task("crew", "2", "w2").unwrap();
    c.complete_task("crew", "1", "w1", Some("parser merged")).unwrap();
    c.send("w1@crew", "lead@crew", "parser done", DEFAULT_MESSAGE_TYPE)
        .unwrap();
    c.broadcast("w2@crew", "tests are slow today", BROADCAST_MESSAGE_TYPE)
        .unwrap();

    let (lead, lead_msgs) = c.poll("lead@crew").unwrap();
    let rendered = render_poll(&lead.team, &lead_msgs, PollFormat::Xml).unwrap();
    assert!(rendered.contains("from=\"w1\" team=\"crew\" type=\"message\""));
    assert!(rendered.contains("from=\"w2\" team=\"crew\" type=\"broadcast\""));
    assert!(c.poll("lead@crew").unwrap().1.is_empty());

    let completed = c.list_tasks("crew", Some(TaskStatus::Completed)).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].result.as_deref(), Some("parser merged"));
    assert_eq!(c.list_tasks("crew", Some(TaskStatus::InProgress)).unwrap()[0].id, "2");
    assert_eq!(c.list_tasks("crew", Some(TaskStatus::Pending)).unwrap()[0].id, "3");

    // Deleting the team removes every inbox and task with it.
    assert!(c.delete_team("crew").unwrap());
    assert!(matches!(c.list_tasks("crew", None), Err(TeamsError::TeamNotFound(_))));
}

#[test]
fn test_read_all_between_appends_and_polls() {
    let dir = tempdir().unwrap();
    let c = Coordinator::new(Config::new(dir.path()));
    c.create_team("t", &members(&["a", "b"])).unwrap();

    c.send("a@t", "b@t", "1", DEFAULT_MESSAGE_TYPE).unwrap();
    assert_eq!(c.read_inbox("b@t").unwrap().len(), 1);
    c.send("a@t", "b@t", "2", DEFAULT_MESSAGE_TYPE).unwrap();
    assert_eq!(c.read_inbox("b@t").unwrap().len(), 2);

    let texts: Vec<String> = c.poll("b@t").unwrap().1.into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["1", "2"]);

    c.send("a@t", "b@t", "3", DEFAULT_MESSAGE_TYPE).unwrap();
    assert_eq!(c.read_inbox("b@t").unwrap().len(), 3);
    let texts: Vec<String> = c.poll("b@t").unwrap().1.into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["3"]);
    assert_eq!(c.mailbox("t").cursor("b").unwrap(), 3);
}

fn kind<T: std::fmt::Debug>(result: agent_teams::Result<T>) -> ErrorKind {
    result.unwrap_err().kind()
}

#[test]
fn test_error_kinds() {
    let dir = tempdir().unwrap();
    let c = Coordinator::new(Config::new(dir.path()));
    c.create_team("t", &members(&["a"])).unwrap();
    c.create_task("t", "s", "", None, None).unwrap();

    assert_eq!(
        kind(c.send("a@t", "a@x", "x", DEFAULT_MESSAGE_TYPE)),
        ErrorKind::Validation
    );
    assert_eq!(kind(c.claim_task("t", "7", "a")), ErrorKind::NotFound);
    assert_eq!(kind(c.complete_task("t", "1", "a", None)), ErrorKind::Conflict);
    assert_eq!(kind(c.team_info("nope")), ErrorKind::NotFound);
}

#[test]
fn test_remove_member_then_readd_starts_fresh() {
    let dir = tempdir().unwrap();
    let c = Coordinator::new(Config::new(dir.path()));
    c.create_team("t", &members(&["a", "b"])).unwrap();
    c.send("a@t", "b@t", "old", DEFAULT_MESSAGE_TYPE).unwrap();
    c.poll("b@t").unwrap();

    c.remove_member("t", "b").unwrap();
    c.add_member("t", "b").unwrap();
    assert!(c.read_inbox("b@t").unwrap().is_empty());
    assert_eq!(c.mailbox("t").cursor("b").unwrap(), 0);

    c.send("a@t", "b@t", "new", DEFAULT_MESSAGE_TYPE).unwrap();
    let (_, msgs) = c.poll("b@t").unwrap();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].text, "new");
}
