//! Connection lifecycle against a local listener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slirc_client::{Client, ClientOptions, Event, EventKind};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct Peer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn accept(listener: &TcpListener) -> Peer {
        let (stream, _) = timeout(WAIT, listener.accept())
            .await
            .expect("client connects")
            .unwrap();
        let (read, writer) = stream.into_split();
        Peer {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn recv(&mut self) -> String {
        timeout(WAIT, self.lines.next_line())
            .await
            .expect("line in time")
            .unwrap()
            .expect("connection open")
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn register(&mut self) {
        assert_eq!(self.recv().await, "NICK bot");
        assert_eq!(self.recv().await, "USER slircbot 8 * :slirc IRC client");
        self.send(":srv 001 bot :Welcome to the network bot!slircbot@127.0.0.1")
            .await;
        assert_eq!(self.recv().await, "WHOIS bot");
    }
}

async fn listener() -> (TcpListener, ClientOptions) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let mut options = ClientOptions::new("127.0.0.1", "bot");
    options.port = port;
    (listener, options)
}

fn forward(client: &Client, kind: EventKind) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    client.on(kind, move |event| {
        let _ = tx.send(event.clone());
    });
    rx
}

#[tokio::test]
async fn registers_and_answers_ping() {
    let (listener, options) = listener().await;
    let client = Client::new(options).unwrap();
    let mut registered = forward(&client, EventKind::Registered);
    let mut pings = forward(&client, EventKind::Ping);
    let task = client.connect().unwrap();
    assert!(matches!(
        client.connect(),
        Err(slirc_client::ClientError::AlreadyConnected)
    ));

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    assert!(timeout(WAIT, registered.recv()).await.unwrap().is_some());
    assert_eq!(client.host_mask(), "bot!slircbot@127.0.0.1");

    peer.send("PING :srv.example").await;
    assert_eq!(peer.recv().await, "PONG srv.example");
    assert_eq!(
        timeout(WAIT, pings.recv()).await.unwrap(),
        Some(Event::Ping {
            server: "srv.example".into()
        })
    );

    let done = client.disconnect("see you");
    assert_eq!(peer.recv().await, "QUIT :see you");
    timeout(WAIT, done).await.unwrap().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
    assert!(!client.is_running());
}

#[tokio::test]
async fn channel_state_follows_server() {
    let (listener, options) = listener().await;
    let client = Client::new(options).unwrap();
    let mut names = forward(&client, EventKind::Names);
    let task = client.connect().unwrap();

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;

    let joined = Arc::new(AtomicUsize::new(0));
    let j = joined.clone();
    client.join_with("#rust", move |_| {
        j.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(peer.recv().await, "JOIN #rust");
    peer.send(":bot!slircbot@127.0.0.1 JOIN #Rust").await;
    peer.send(":srv 353 bot = #Rust :@bot alice").await;
    peer.send(":srv 366 bot #Rust :End of /NAMES list.").await;
    assert_eq!(peer.recv().await, "MODE #Rust");
    assert!(timeout(WAIT, names.recv()).await.unwrap().is_some());

    assert_eq!(joined.load(Ordering::SeqCst), 1);
    let channel = client.channel("#RUST").expect("joined");
    assert_eq!(channel.users.len(), 2);

    client.say("#rust", "hello there");
    assert_eq!(peer.recv().await, "PRIVMSG #rust :hello there");

    let done = client.disconnect("");
    assert_eq!(peer.recv().await, "QUIT");
    timeout(WAIT, done).await.unwrap().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn reconnects_after_server_drop() {
    let (listener, mut options) = listener().await;
    options.retry_delay_ms = 10;
    let client = Client::new(options).unwrap();
    let mut connects = forward(&client, EventKind::Connect);
    let task = client.connect().unwrap();

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    assert!(timeout(WAIT, connects.recv()).await.unwrap().is_some());
    drop(peer);

    let mut peer = Peer::accept(&listener).await;
    assert_eq!(peer.recv().await, "NICK bot");
    assert!(timeout(WAIT, connects.recv()).await.unwrap().is_some());

    let done = client.disconnect("bye");
    assert_eq!(peer.recv().await, "USER slircbot 8 * :slirc IRC client");
    assert_eq!(peer.recv().await, "QUIT bye");
    timeout(WAIT, done).await.unwrap().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn gives_up_after_retry_cap() {
    let (listener, mut options) = listener().await;
    drop(listener);
    options.retry_count = Some(2);
    options.retry_delay_ms = 10;

    let client = Client::new(options).unwrap();
    let net_errors = Arc::new(AtomicUsize::new(0));
    let n = net_errors.clone();
    client.on(EventKind::NetError, move |_| {
        n.fetch_add(1, Ordering::SeqCst);
    });
    let mut aborts = forward(&client, EventKind::Abort);

    let task = client.connect().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());

    assert_eq!(aborts.try_recv(), Ok(Event::Abort { retry_count: 2 }));
    assert!(aborts.try_recv().is_err());
    assert_eq!(net_errors.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_cap_counts_registered_sessions() {
    let (listener, mut options) = listener().await;
    options.retry_count = Some(2);
    options.retry_delay_ms = 10;
    let client = Client::new(options).unwrap();
    let mut aborts = forward(&client, EventKind::Abort);
    let task = client.connect().unwrap();

    for _ in 0..3 {
        let mut peer = Peer::accept(&listener).await;
        peer.register().await;
        drop(peer);
    }

    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
    assert_eq!(aborts.try_recv(), Ok(Event::Abort { retry_count: 2 }));
    assert!(aborts.try_recv().is_err());
    assert!(timeout(Duration::from_millis(100), listener.accept())
        .await
        .is_err());
}

#[tokio::test]
async fn line_breaks_in_caller_text_keep_connection() {
    let (listener, options) = listener().await;
    let client = Client::new(options).unwrap();
    let net_errors = Arc::new(AtomicUsize::new(0));
    let n = net_errors.clone();
    client.on(EventKind::NetError, move |_| {
        n.fetch_add(1, Ordering::SeqCst);
    });
    let mut connects = forward(&client, EventKind::Connect);
    let task = client.connect().unwrap();

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    assert!(timeout(WAIT, connects.recv()).await.unwrap().is_some());

    client.say("#c", "hello\rworld");
    assert_eq!(peer.recv().await, "PRIVMSG #c hello");
    assert_eq!(peer.recv().await, "PRIVMSG #c world");

    client.send("PRIVMSG", ["#c", "sneaky\r\nQUIT"]);
    client.say("#c", "still here");
    assert_eq!(peer.recv().await, "PRIVMSG #c :still here");

    assert_eq!(net_errors.load(Ordering::SeqCst), 0);
    assert!(connects.try_recv().is_err());

    let done = client.disconnect("bye");
    assert_eq!(peer.recv().await, "QUIT bye");
    timeout(WAIT, done).await.unwrap().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn flood_protection_keeps_order() {
    let (listener, mut options) = listener().await;
    options.flood_protection = true;
    options.flood_protection_delay_ms = 15;
    let client = Client::new(options).unwrap();
    let task = client.connect().unwrap();

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;

    for text in ["one", "two", "three"] {
        client.say("#c", text);
    }
    for text in ["one", "two", "three"] {
        assert_eq!(peer.recv().await, format!("PRIVMSG #c {}", text));
    }

    let done = client.disconnect("bye");
    assert_eq!(peer.recv().await, "QUIT bye");
    timeout(WAIT, done).await.unwrap().unwrap();
    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn keepalive_ping_then_timeout() {
    let (listener, mut options) = listener().await;
    options.ping_idle_ms = 50;
    options.ping_timeout_ms = 50;
    options.retry_count = Some(0);
    let client = Client::new(options).unwrap();
    let mut aborts = forward(&client, EventKind::Abort);
    let task = client.connect().unwrap();

    let mut peer = Peer::accept(&listener).await;
    peer.register().await;
    assert_eq!(peer.recv().await, "PING 1");

    assert!(timeout(WAIT, task).await.unwrap().unwrap().is_ok());
    assert_eq!(aborts.try_recv(), Ok(Event::Abort { retry_count: 0 }));
}
