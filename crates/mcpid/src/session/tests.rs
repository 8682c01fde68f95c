//! Session lifecycle tests over loopback TCP.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use mockall::mock;
use rstest::{fixture, rstest};

use super::*;
use crate::commands::CommandError;
use crate::tests::support::{RecordingRegistry, ScriptedCommands, TestClient, wait_until};
use crate::transport::tcp_pair;

mock! {
    Commands {}
    impl CommandHandler for Commands {
        fn handle_command(
            &self,
            name: &str,
            args: &[String],
        ) -> Result<Option<String>, CommandError>;
    }
}

struct Harness {
    session: Arc<Session>,
    registry: Arc<RecordingRegistry>,
    client: TestClient,
}

impl Harness {
    fn start(commands: Arc<dyn CommandHandler>, options: SessionOptions) -> Self {
        let (stream, client) = tcp_pair();
        let registry = Arc::new(RecordingRegistry::default());
        let session = Session::start(
            stream,
            commands,
            Arc::clone(&registry) as Arc<dyn SessionRegistry>,
            options,
        )
        .expect("start session");
        Self {
            session,
            registry,
            client: TestClient::new(client),
        }
    }

    fn close_count(&self) -> usize {
        self.registry.close_count(self.session.id())
    }

    fn wait_for_close(&self) -> bool {
        wait_until(|| !self.session.is_running())
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.session.close();
        let _ = self.session.join();
    }
}

#[fixture]
fn scripted() -> Harness {
    Harness::start(Arc::new(ScriptedCommands::new()), SessionOptions::default())
}

#[test]
fn dispatches_each_line_to_the_command_handler() {
    let mut commands = MockCommands::new();
    commands
        .expect_handle_command()
        .withf(|name, args| name == "ping" && args.len() == 1 && args.first().is_some_and(String::is_empty))
        .times(1)
        .returning(|_, _| Ok(Some(String::from("pong"))));
    let mut harness = Harness::start(Arc::new(commands), SessionOptions::default());

    harness.client.send_line("ping()");

    assert_eq!(harness.client.read_line(), "pong\n");
    assert!(harness.session.is_running());
}

#[test]
fn passes_arguments_verbatim() {
    let commands = Arc::new(ScriptedCommands::new());
    let mut harness = Harness::start(
        Arc::clone(&commands) as Arc<dyn CommandHandler>,
        SessionOptions::default(),
    );

    harness.client.send_line("noop(1, two,,3)");
    harness.client.send_line("ping()");
    assert_eq!(harness.client.read_line(), "pong\n");

    let calls = commands.calls();
    let (name, args) = calls.first().expect("noop should be recorded");
    assert_eq!(name, "noop");
    assert_eq!(args, &vec!["1", " two", "", "3"]);
}

#[rstest]
fn silent_commands_send_nothing(mut scripted: Harness) {
    scripted.client.send_line("noop()");
    scripted.client.send_line("ping()");

    assert_eq!(scripted.client.read_line(), "pong\n");
    assert!(scripted.session.is_running());
}

#[rstest]
fn responses_follow_request_order(mut scripted: Harness) {
    scripted.client.send_raw(b"ping()\nnoop()\r\n\nping()\n");

    assert_eq!(scripted.client.read_line(), "pong\n");
    assert_eq!(scripted.client.read_line(), "pong\n");
    assert!(scripted.session.is_running());
}

#[rstest]
fn sent_values_arrive_in_send_order(mut scripted: Harness) {
    scripted.session.send("chat(hello)");
    scripted.session.send(42);
    scripted.session.send("");

    assert_eq!(scripted.client.read_line(), "chat(hello)\n");
    assert_eq!(scripted.client.read_line(), "42\n");
    assert_eq!(scripted.client.read_line(), "\n");
}

#[rstest]
fn responses_and_sent_values_share_one_order(mut scripted: Harness) {
    scripted.client.send_line("ping()");
    assert_eq!(scripted.client.read_line(), "pong\n");

    scripted.session.send("x");
    scripted.client.send_line("ping()");

    assert_eq!(scripted.client.read_line(), "x\n");
    assert_eq!(scripted.client.read_line(), "pong\n");
}

#[rstest]
fn close_runs_once_across_threads(mut scripted: Harness) {
    let closers: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&scripted.session);
            thread::spawn(move || session.close())
        })
        .collect();
    for closer in closers {
        closer.join().expect("closer thread");
    }
    scripted.session.close();

    assert!(!scripted.session.is_running());
    assert_eq!(scripted.close_count(), 1);
    assert!(scripted.client.sees_end_of_stream());
    scripted.session.join().expect("join loops");
}

#[rstest]
fn client_hang_up_closes_the_session(scripted: Harness) {
    scripted.client.hang_up();

    assert!(scripted.wait_for_close(), "session should close on EOF");
    assert!(wait_until(|| scripted.close_count() == 1));
    scripted.session.join().expect("join loops");
    assert_eq!(scripted.close_count(), 1);
}

#[rstest]
#[case::missing_open_paren("ping")]
#[case::missing_close_paren("ping(")]
#[case::unknown_command("world.setBlock(1,2,3)")]
#[case::failing_command("fail()")]
fn bad_requests_close_the_session(mut scripted: Harness, #[case] request: &str) {
    scripted.client.send_line(request);

    assert!(scripted.wait_for_close(), "session should close after {request:?}");
    assert!(scripted.client.sees_end_of_stream());
    assert!(wait_until(|| scripted.close_count() == 1));
}

#[test]
fn handler_errors_close_the_session() {
    let mut commands = MockCommands::new();
    commands.expect_handle_command().returning(|name, _| {
        Err(CommandError::InvalidArguments {
            name: name.to_owned(),
            reason: String::from("rejected"),
        })
    });
    let mut harness = Harness::start(Arc::new(commands), SessionOptions::default());

    harness.client.send_line("echo(x)");

    assert!(harness.wait_for_close());
    assert!(harness.client.sees_end_of_stream());
}

#[test]
fn oversized_lines_close_the_session() {
    let mut harness = Harness::start(
        Arc::new(ScriptedCommands::new()),
        SessionOptions { max_line_bytes: 16 },
    );

    harness.client.send_raw(&[b'a'; 64]);

    assert!(harness.wait_for_close());
}

#[rstest]
fn send_after_close_is_dropped(mut scripted: Harness) {
    scripted.session.close();
    scripted.session.send("too late");

    assert!(scripted.client.sees_end_of_stream());
    assert_eq!(scripted.session.queue.len(), 0);
}

#[rstest]
fn join_waits_for_both_loops(scripted: Harness) {
    scripted.session.close();
    scripted.session.join().expect("join loops");
    // A second join has nothing left to wait for.
    scripted.session.join().expect("join again");
}

#[test]
fn session_ids_increase() {
    let first = SessionId::next();
    let second = SessionId::next();
    assert!(second > first);
    assert!(second.get() > first.get());
}

#[test]
fn session_ids_are_unique_across_threads() {
    let workers: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| (0..100).map(|_| SessionId::next()).collect::<Vec<_>>()))
        .collect();
    let mut seen = HashSet::new();
    for worker in workers {
        for id in worker.join().expect("id worker") {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), 800);
}

#[test]
fn started_sessions_get_increasing_ids() {
    let first = Harness::start(Arc::new(ScriptedCommands::new()), SessionOptions::default());
    let second = Harness::start(Arc::new(ScriptedCommands::new()), SessionOptions::default());
    assert!(second.session.id() > first.session.id());
}
