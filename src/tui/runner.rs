//! TUI Runner - main loop that owns the terminal and drives generation
//!
//! The TuiRunner is responsible for:
//! - Dispatching events to App for handling
//! - Spawning the background generation task on submit
//! - Draining stream chunks into the loading indicator
//! - Applying the settled result to the session and caching the markdown
//! - Executing queued exports

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::export::{self, PlanDocument};
use crate::llm::{GenerationRequest, LlmClient, StreamChunk, create_client};
use crate::plan::PlanRequest;
use crate::prompts::PromptLoader;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::{PendingExport, PlanTab, View};
use super::views;

/// Result from the background generation task
#[derive(Debug)]
enum GenTaskResult {
    /// Stream fully consumed, final accumulated text attached
    Response { text: String },
    /// Error occurred; message is already user-displayable
    Error(String),
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application controller
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Event handler
    event_handler: EventHandler,
    /// Generation client (None when the API key is not configured)
    llm_client: Option<Arc<dyn LlmClient>>,
    /// Prompt templates
    prompts: PromptLoader,
    /// Max tokens for generation requests (from config)
    max_tokens: u32,
    /// Directory exports are written to
    export_dir: PathBuf,
    /// Request metadata of the last submission (for export)
    active_request: Option<PlanRequest>,
    /// Receiver for stream chunks (populated while a request is in flight)
    stream_rx: Option<mpsc::Receiver<StreamChunk>>,
    /// Receiver for the generation task result
    result_rx: Option<mpsc::Receiver<GenTaskResult>>,
    /// Handle to the background generation task
    gen_task: Option<JoinHandle<()>>,
}

impl TuiRunner {
    /// Create a new TuiRunner from configuration
    pub fn new(terminal: Tui, config: &Config) -> Self {
        debug!("TuiRunner::new: called");
        let llm_client = match create_client(&config.llm) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("No generation client available: {}", e);
                None
            }
        };
        let api_configured = llm_client.is_some();

        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let prompts = PromptLoader::new(&base);

        Self {
            app: App::new(api_configured, config.llm.api_key_env.clone()),
            terminal,
            event_handler: EventHandler::new(Duration::from_millis(33)), // ~30 FPS
            llm_client,
            prompts,
            max_tokens: config.llm.max_tokens,
            export_dir: config.export.out_dir.clone(),
            active_request: None,
            stream_rx: None,
            result_rx: None,
            gen_task: None,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            // Process stream chunks and settled results before drawing
            self.process_stream_chunks();
            self.process_results();

            self.terminal.draw(|frame| views::render(self.app.state_mut(), frame))?;

            match self.event_handler.next().await? {
                Event::Tick => self.handle_tick(),
                Event::Key(key_event) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        // Drop any still-running generation with the terminal
        if let Some(task) = self.gen_task.take() {
            debug!("TuiRunner::run: aborting in-flight generation task");
            task.abort();
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Handle tick event - pick up queued submit/export actions
    fn handle_tick(&mut self) {
        if let Some(request) = self.app.state_mut().pending_submit.take() {
            debug!(unit_title = %request.unit_title, "TuiRunner::handle_tick: pending submit");
            self.start_generation(request);
        }

        if let Some(export) = self.app.state_mut().pending_export.take() {
            debug!(?export, "TuiRunner::handle_tick: pending export");
            self.run_export(export);
        }
    }

    /// Start a new generation request (spawns the background task)
    fn start_generation(&mut self, request: PlanRequest) {
        debug!(unit_title = %request.unit_title, "TuiRunner::start_generation: called");

        let Some(llm) = self.llm_client.clone() else {
            // submit_form already gates on this; keep the invariant anyway
            self.app
                .state_mut()
                .set_status("No generation client configured. Check your config's api-key-env.");
            return;
        };

        // Compose the payload. This is pure interpolation; a failure here
        // means a broken template override.
        let system_instruction = match self.prompts.system_prompt() {
            Ok(s) => s,
            Err(e) => {
                self.app.state_mut().session.apply_error(e.to_string());
                return;
            }
        };
        let prompt = match self.prompts.user_prompt(&request) {
            Ok(p) => p,
            Err(e) => {
                self.app.state_mut().session.apply_error(e.to_string());
                return;
            }
        };

        info!("Starting generation for unit '{}'", request.unit_title);
        self.app.state_mut().session.begin();
        self.app.state_mut().start_streaming();
        self.app.state_mut().current_view = View::Plans;
        self.app.state_mut().active_tab = PlanTab::LearningPlan;
        self.active_request = Some(request);

        let generation = GenerationRequest {
            system_instruction,
            prompt,
            max_tokens: self.max_tokens,
        };

        let (stream_tx, stream_rx) = mpsc::channel::<StreamChunk>(100);
        self.stream_rx = Some(stream_rx);

        let (result_tx, result_rx) = mpsc::channel::<GenTaskResult>(1);
        self.result_rx = Some(result_rx);

        self.gen_task = Some(tokio::spawn(async move {
            debug!("generation task started");
            let result = match llm.stream(generation, stream_tx).await {
                Ok(response) => {
                    debug!(text_len = response.text.len(), "generation stream completed");
                    GenTaskResult::Response { text: response.text }
                }
                Err(e) => {
                    warn!("generation stream failed: {}", e);
                    GenTaskResult::Error(e.user_message())
                }
            };
            let _ = result_tx.send(result).await;
        }));
    }

    /// Process pending stream chunks (non-blocking)
    ///
    /// Chunks only feed the loading indicator; the response is parsed once,
    /// after the stream has been fully consumed.
    fn process_stream_chunks(&mut self) {
        if let Some(rx) = &mut self.stream_rx {
            let chunks: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
            for chunk in chunks {
                match chunk {
                    StreamChunk::MessageStart { input_tokens } => {
                        self.app.state_mut().streaming_input_tokens = Some(input_tokens);
                    }
                    StreamChunk::TextDelta(text) => {
                        self.app.state_mut().streaming_received += text.len();
                    }
                    StreamChunk::MessageDone { .. } | StreamChunk::Error(_) => {
                        // Terminal state arrives via the result channel
                    }
                }
            }
        }
    }

    /// Process the settled generation result (non-blocking)
    fn process_results(&mut self) {
        let result = match &mut self.result_rx {
            Some(rx) => match rx.try_recv() {
                Ok(result) => result,
                Err(_) => return,
            },
            None => return,
        };

        match result {
            GenTaskResult::Response { text } => {
                info!("Generation settled: {} chars", text.len());
                self.app.state_mut().session.apply_response(&text);
                self.update_markdown();
            }
            GenTaskResult::Error(message) => {
                warn!("Generation settled with error: {}", message);
                self.app.state_mut().session.apply_error(message);
            }
        }

        self.app.state_mut().finish_streaming();
        self.stream_rx = None;
        self.result_rx = None;
        self.gen_task = None;
    }

    /// Cache markdown renderings of the generated HTML for display
    fn update_markdown(&mut self) {
        debug!("TuiRunner::update_markdown: called");
        let state = self.app.state_mut();
        state.learning_plan_md = html2md::rewrite_html(&state.session.learning_plan_html, false);
        state.session_plans_md = html2md::rewrite_html(&state.session.session_plans_html, false);
        state.plans_scroll = 0;
    }

    /// Execute a queued export
    fn run_export(&mut self, export: PendingExport) {
        let Some(request) = self.active_request.clone() else {
            self.app.state_mut().set_status("Nothing to export yet");
            return;
        };

        let docs: Vec<PlanDocument> = match export {
            PendingExport::ActiveTab => match self.app.state().active_tab {
                PlanTab::LearningPlan => vec![PlanDocument::LearningPlan],
                PlanTab::SessionPlans => vec![PlanDocument::SessionPlans],
            },
            PendingExport::Both => vec![PlanDocument::LearningPlan, PlanDocument::SessionPlans],
        };

        let mut written = Vec::new();
        for doc in docs {
            let fragment = match doc {
                PlanDocument::LearningPlan => self.app.state().session.learning_plan_html.clone(),
                PlanDocument::SessionPlans => self.app.state().session.session_plans_html.clone(),
            };

            match export::write_document(&self.export_dir, doc, &fragment, &request) {
                Ok(Some(path)) => written.push(path.display().to_string()),
                Ok(None) => {
                    debug!(?doc, "TuiRunner::run_export: empty fragment, skipped");
                }
                Err(e) => {
                    self.app.state_mut().set_status(format!("Export failed: {}", e));
                    return;
                }
            }
        }

        if written.is_empty() {
            self.app.state_mut().set_status("Nothing to export for this tab");
        } else {
            self.app.state_mut().set_status(format!("Exported {}", written.join(", ")));
        }
    }
}
