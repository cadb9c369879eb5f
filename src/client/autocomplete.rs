//! # 자동완성(Autocomplete) 컨트롤러
//!
//! 검색창 입력을 디바운스해서 추천어를 가져오고, 추천어 호출이 한 번이라도 실패하면
//! 이후 호출을 막는 로컬 서킷 브레이커를 구현합니다.
//!
//! ## 상태 전이
//! ```text
//!            실패                       (자동 복구 타이머 없음)
//! Enabled ─────────▶ Disabled ──┐
//!    ▲                          │ 이후 입력은 네트워크 호출 없이 무시
//!    └──────────────────────────┘
//!      성공 응답 도착 또는 SessionReset
//! ```
//!
//! - 입력 앞뒤 공백을 뺀 길이가 2글자 미만이면 호출하지 않고 추천어를 비웁니다.
//! - 입력이 300ms 동안 바뀌지 않아야 호출합니다. 새 입력은 대기 중인 타이머를 취소합니다.
//! - 추천어 선택은 검색어를 바꾸고 목록을 비우지만 새 호출을 만들지 않습니다.
//! - 이미 보낸 요청은 취소하지 않으며, 늦게 도착한 응답도 그대로 적용합니다.
//!   (현재 입력과 일치하는지 확인하지 않음)
//!
//! 구조:
//! - `AutocompleteMachine`: 이벤트를 받아 명령을 돌려주는 순수 상태 머신
//! - `AutocompleteController`: 머신을 소유한 tokio 태스크. 채널로 이벤트를 받고,
//!   디바운스 타이머와 추천어 요청을 실행하고, 화면 상태를 `watch`로 내보냅니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::api::{ClientError, SuggestionSource};

/// 입력이 이 시간 동안 안정되어야 추천어를 요청합니다.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// 추천어를 요청하는 최소 글자 수 (앞뒤 공백 제외)
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteState {
    Enabled,
    Disabled,
}

/// 컨트롤러가 처리하는 이벤트
#[derive(Debug)]
pub enum Event {
    /// 검색창 텍스트가 바뀜
    InputChanged(String),
    /// 디바운스 타이머 만료. 더 새 입력이 있으면 무시됩니다.
    TimerFired { generation: u64 },
    /// 추천어 요청 결과
    ResponseReceived(Result<Vec<String>, ClientError>),
    /// 사용자가 추천어를 선택함
    SuggestionSelected(String),
    /// 새 세션 시작 (차단된 자동완성도 다시 켜짐)
    SessionReset,
}

/// 상태 머신이 실행을 요청하는 부수 효과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 기존 타이머를 취소하고 새 타이머를 시작
    ScheduleFetch { generation: u64, delay: Duration },
    CancelTimer,
    /// 추천어 요청 전송
    Fetch(String),
}

/// 화면에 그릴 현재 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteView {
    pub state: AutocompleteState,
    pub query: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AutocompleteMachine {
    state: AutocompleteState,
    query: String,
    suggestions: Vec<String>,
    // 입력/선택마다 증가. 타이머 이벤트가 최신 입력의 것인지 판별합니다.
    generation: u64,
    pending: Option<u64>,
    delay: Duration,
}

impl Default for AutocompleteMachine {
    fn default() -> Self {
        Self::with_delay(DEBOUNCE_DELAY)
    }
}

impl AutocompleteMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: AutocompleteState::Enabled,
            query: String::new(),
            suggestions: Vec::new(),
            generation: 0,
            pending: None,
            delay,
        }
    }

    pub fn state(&self) -> AutocompleteState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn view(&self) -> AutocompleteView {
        AutocompleteView {
            state: self.state,
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
        }
    }

    /// 이벤트 하나를 처리하고, 실행해야 할 명령이 있으면 돌려줍니다.
    pub fn handle(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::InputChanged(text) => {
                self.query = text;
                self.generation += 1;

                if self.query.trim().chars().count() < MIN_QUERY_CHARS {
                    self.suggestions.clear();
                    return self.pending.take().map(|_| Command::CancelTimer);
                }

                self.pending = Some(self.generation);
                Some(Command::ScheduleFetch {
                    generation: self.generation,
                    delay: self.delay,
                })
            }

            Event::TimerFired { generation } => {
                if self.pending != Some(generation) {
                    return None;
                }
                self.pending = None;

                match self.state {
                    AutocompleteState::Enabled => Some(Command::Fetch(self.query.clone())),
                    AutocompleteState::Disabled => {
                        tracing::debug!(query = %self.query, "autocomplete disabled, fetch skipped");
                        None
                    }
                }
            }

            Event::ResponseReceived(Ok(suggestions)) => {
                self.state = AutocompleteState::Enabled;
                self.suggestions = suggestions;
                None
            }

            Event::ResponseReceived(Err(err)) => {
                tracing::warn!(error = %err, "autocomplete suggestions disabled");
                self.state = AutocompleteState::Disabled;
                self.suggestions.clear();
                None
            }

            Event::SuggestionSelected(selection) => {
                self.query = selection;
                self.suggestions.clear();
                self.generation += 1;
                self.pending.take().map(|_| Command::CancelTimer)
            }

            Event::SessionReset => {
                let pending = self.pending.take();
                *self = Self {
                    generation: self.generation + 1,
                    ..Self::with_delay(self.delay)
                };
                pending.map(|_| Command::CancelTimer)
            }
        }
    }
}

/// 취소 가능한 디바운스 타이머. 드롭되면 대기 중인 타이머도 취소됩니다.
#[derive(Default)]
struct DebounceTimer(Option<JoinHandle<()>>);

impl DebounceTimer {
    fn start(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.0 = Some(handle);
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 자동완성 컨트롤러
///
/// 한 세션(검색 폼 하나)에 하나씩 만듭니다. 드롭하면 이벤트 루프와
/// 대기 중인 디바운스 타이머가 함께 정리됩니다.
pub struct AutocompleteController {
    events: mpsc::UnboundedSender<Event>,
    view: watch::Receiver<AutocompleteView>,
    task: JoinHandle<()>,
}

impl AutocompleteController {
    /// 기본 디바운스(300ms)로 컨트롤러를 시작합니다. tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(source: Arc<dyn SuggestionSource>) -> Self {
        Self::spawn_with_delay(source, DEBOUNCE_DELAY)
    }

    pub fn spawn_with_delay(source: Arc<dyn SuggestionSource>, delay: Duration) -> Self {
        let machine = AutocompleteMachine::with_delay(delay);
        let (view_tx, view_rx) = watch::channel(machine.view());
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(machine, source, tx.clone(), rx, view_tx));

        Self {
            events: tx,
            view: view_rx,
            task,
        }
    }

    pub fn input(&self, text: impl Into<String>) {
        self.send(Event::InputChanged(text.into()));
    }

    pub fn select(&self, suggestion: impl Into<String>) {
        self.send(Event::SuggestionSelected(suggestion.into()));
    }

    pub fn reset(&self) {
        self.send(Event::SessionReset);
    }

    /// 마지막으로 처리된 이벤트 이후의 상태
    pub fn view(&self) -> AutocompleteView {
        self.view.borrow().clone()
    }

    /// 상태 변경을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<AutocompleteView> {
        self.view.clone()
    }

    fn send(&self, event: Event) {
        // 루프는 컨트롤러가 드롭될 때만 끝나므로 전송 실패는 무시합니다.
        let _ = self.events.send(event);
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_loop(
    mut machine: AutocompleteMachine,
    source: Arc<dyn SuggestionSource>,
    tx: mpsc::UnboundedSender<Event>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    view: watch::Sender<AutocompleteView>,
) {
    let mut timer = DebounceTimer::default();

    while let Some(event) = rx.recv().await {
        match machine.handle(event) {
            Some(Command::ScheduleFetch { generation, delay }) => {
                let tx = tx.clone();
                timer.start(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::TimerFired { generation });
                }));
            }
            Some(Command::CancelTimer) => timer.cancel(),
            Some(Command::Fetch(query)) => {
                let source = Arc::clone(&source);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = source.suggestions(&query).await;
                    let _ = tx.send(Event::ResponseReceived(result));
                });
            }
            None => {}
        }

        view.send_replace(machine.view());
    }
}
