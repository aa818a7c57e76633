// llcnfc-rs/llcnfc/src/runtime/service.rs

use super::channel::LinkChannel;
use super::clock::TokioTimers;
use super::io::StreamTransport;
use super::Internal;
use crate::config::LinkConfig;
use crate::link::{Event, Link, LinkStatus, Notification};
use crate::types::SendId;
use crate::{Error, Result};
use async_trait::async_trait;
use log::{debug, trace, warn};
use std::collections::{HashMap, VecDeque};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};

const COMMAND_QUEUE_DEPTH: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Init(Reply<()>),
    Send(Vec<u8>, Reply<()>),
    Receive(Reply<Vec<u8>>),
    Release(Reply<()>),
    Status(Reply<LinkStatus>),
}

/// Entry point of the tokio runtime.
pub struct LlcService;

impl LlcService {
    /// Start a link over `stream` and return a handle to it.
    ///
    /// The link is not opened yet; call [`LinkChannel::init`]. Must be
    /// called from inside a tokio runtime. The link task stops once every
    /// handle has been dropped.
    pub fn spawn<S>(stream: S, config: LinkConfig) -> Result<LlcHandle>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (events, internal) = mpsc::unbounded_channel();
        let transport = StreamTransport::spawn(stream, events.clone());
        let timers = TokioTimers::new(events);
        let link = Link::new(config, transport, timers)?;
        let (commands_tx, commands) = mpsc::channel(COMMAND_QUEUE_DEPTH);

        let actor = Actor {
            link,
            commands,
            internal,
            init_waiter: None,
            send_waiters: HashMap::new(),
            backlog: VecDeque::new(),
            receive_waiters: VecDeque::new(),
            inbox: VecDeque::new(),
        };
        tokio::spawn(actor.run());
        Ok(LlcHandle {
            commands: commands_tx,
        })
    }
}

/// Cloneable handle to a running link.
#[derive(Debug, Clone)]
pub struct LlcHandle {
    commands: mpsc::Sender<Command>,
}

impl LlcHandle {
    async fn request<R>(&self, command: impl FnOnce(Reply<R>) -> Command) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| Error::LinkDown)?;
        rx.await.map_err(|_| Error::Released)?
    }

    /// Snapshot of the link counters.
    pub async fn status(&self) -> Result<LinkStatus> {
        self.request(Command::Status).await
    }
}

#[async_trait]
impl LinkChannel for LlcHandle {
    async fn init(&self) -> Result<()> {
        self.request(Command::Init).await
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        let payload = payload.to_vec();
        self.request(|tx| Command::Send(payload, tx)).await
    }

    async fn receive(&self) -> Result<Vec<u8>> {
        self.request(Command::Receive).await
    }

    async fn release(&self) -> Result<()> {
        self.request(Command::Release).await
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Init(_) => f.write_str("Init"),
            Command::Send(p, _) => write!(f, "Send({} bytes)", p.len()),
            Command::Receive(_) => f.write_str("Receive"),
            Command::Release(_) => f.write_str("Release"),
            Command::Status(_) => f.write_str("Status"),
        }
    }
}

struct Actor {
    link: Link<StreamTransport, TokioTimers>,
    commands: mpsc::Receiver<Command>,
    internal: mpsc::UnboundedReceiver<Internal>,
    init_waiter: Option<Reply<()>>,
    send_waiters: HashMap<SendId, Reply<()>>,
    /// Sends waiting for room in the window, in submission order.
    backlog: VecDeque<(Vec<u8>, Reply<()>)>,
    receive_waiters: VecDeque<Reply<Vec<u8>>>,
    /// Payloads that arrived with nobody waiting.
    inbox: VecDeque<Vec<u8>>,
}

impl Actor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(internal) = self.internal.recv() => self.on_internal(internal),
            }
            self.settle();
        }
        debug!("all handles dropped, stopping link task");
        let _ = self.link.release();
    }

    fn on_command(&mut self, command: Command) {
        trace!("command {:?}", command);
        match command {
            Command::Init(reply) => {
                if let Some(previous) = self.init_waiter.take() {
                    let _ = previous.send(Err(Error::Released));
                }
                self.inbox.clear();
                self.fail_backlog(Error::LinkDown);
                match self.link.init() {
                    Ok(()) => self.init_waiter = Some(reply),
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }
            Command::Send(payload, reply) => {
                if self.backlog.is_empty() {
                    self.submit(payload, reply);
                } else {
                    self.backlog.push_back((payload, reply));
                }
            }
            Command::Receive(reply) => {
                if let Some(payload) = self.inbox.pop_front() {
                    let _ = reply.send(Ok(payload));
                    return;
                }
                match self.link.receive() {
                    Ok(()) => self.receive_waiters.push_back(reply),
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }
            Command::Release(reply) => {
                let result = self.link.release();
                self.fail_all(Error::Released);
                self.inbox.clear();
                let _ = reply.send(result);
            }
            Command::Status(reply) => {
                let _ = reply.send(Ok(self.link.status()));
            }
        }
    }

    /// Returns false when the window is full and the send was backlogged.
    fn submit(&mut self, payload: Vec<u8>, reply: Reply<()>) -> bool {
        match self.link.send(&payload) {
            Ok(id) => {
                self.send_waiters.insert(id, reply);
                true
            }
            Err(Error::Busy) => {
                trace!("window full, holding send of {} byte(s)", payload.len());
                self.backlog.push_front((payload, reply));
                false
            }
            Err(e) => {
                let _ = reply.send(Err(e));
                true
            }
        }
    }

    fn on_internal(&mut self, internal: Internal) {
        match internal {
            Internal::Io { epoch, event } => {
                if epoch != self.link.transport().epoch() {
                    trace!("dropping completion from aborted epoch {}", epoch);
                    return;
                }
                self.link.handle_event(event);
            }
            Internal::Timer { id, token } => {
                if self.link.timers_mut().take_if_current(id, token) {
                    self.link.handle_event(Event::TimerExpired(id));
                }
            }
        }
    }

    /// Route notifications to the waiting callers.
    fn settle(&mut self) {
        while let Some(notification) = self.link.poll_notification() {
            match notification {
                Notification::InitCompleted => {
                    if let Some(reply) = self.init_waiter.take() {
                        let _ = reply.send(Ok(()));
                    }
                }
                Notification::InitFailed => {
                    if let Some(reply) = self.init_waiter.take() {
                        let _ = reply.send(Err(Error::InitFailed));
                    }
                    self.fail_all(Error::LinkDown);
                }
                Notification::LinkReset => debug!("link reset by recovery"),
                Notification::LinkDown => {
                    warn!("link down");
                    self.fail_all(Error::LinkDown);
                }
                Notification::SendCompleted(id) => {
                    if let Some(reply) = self.send_waiters.remove(&id) {
                        let _ = reply.send(Ok(()));
                    }
                }
                Notification::SendFailed(id) => {
                    if let Some(reply) = self.send_waiters.remove(&id) {
                        let _ = reply.send(Err(Error::LinkDown));
                    }
                }
                Notification::ReceiveCompleted(payload) | Notification::Received(payload) => {
                    self.hand_out(payload)
                }
            }
        }

        while let Some((payload, reply)) = self.backlog.pop_front() {
            if !self.submit(payload, reply) {
                break;
            }
        }
        if !self.receive_waiters.is_empty() && self.link.is_up() {
            let _ = self.link.receive();
        }
    }

    fn hand_out(&mut self, mut payload: Vec<u8>) {
        while let Some(reply) = self.receive_waiters.pop_front() {
            match reply.send(Ok(payload)) {
                Ok(()) => return,
                // caller gave up; try the next one
                Err(Ok(returned)) => payload = returned,
                Err(Err(_)) => return,
            }
        }
        self.inbox.push_back(payload);
    }

    fn fail_backlog(&mut self, err: Error) {
        for (_, reply) in self.backlog.drain(..) {
            let _ = reply.send(Err(err.clone()));
        }
    }

    fn fail_all(&mut self, err: Error) {
        if let Some(reply) = self.init_waiter.take() {
            let _ = reply.send(Err(err.clone()));
        }
        for (_, reply) in self.send_waiters.drain() {
            let _ = reply.send(Err(err.clone()));
        }
        self.fail_backlog(err.clone());
        for reply in self.receive_waiters.drain(..) {
            let _ = reply.send(Err(err.clone()));
        }
    }
}
