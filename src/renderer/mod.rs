//! Frame-scheduled, double-buffered rendering of a scene graph.
//!
//! [`RenderEngine`] owns the terminal session, the scene graph and a pair of
//! cell buffers. Scene mutations call back into the engine's
//! [`FrameScheduler`], which coalesces them into at most one frame per
//! interval. Each frame lays out and paints the whole tree into the current
//! buffer, diffs it against the previous one and writes only the difference.
//!
//! # Architecture
//!
//! - **Current buffer**: painted from scratch every frame
//! - **Previous buffer**: the last committed frame, the diff baseline
//!
//! A resize throws the baseline away, so the next frame repaints every cell.
//!
//! # Examples
//!
//! ```
//! use termscene::renderer::{RenderEngine, RendererConfig};
//! use termscene::scene::{NodeOptions, TextProps};
//!
//! let mut engine = RenderEngine::new(Vec::new(), 20, 2, RendererConfig::headless()).unwrap();
//! engine.start().unwrap();
//! {
//!     let scene = engine.scene();
//!     let mut scene = scene.borrow_mut();
//!     let root = scene.root();
//!     let text = scene.create_text(TextProps::new("ready"), NodeOptions::default()).unwrap();
//!     scene.add(root, text, None);
//! }
//! engine.render_frame().unwrap();
//! assert!(String::from_utf8_lossy(engine.output()).contains("ready"));
//! ```

mod listeners;
mod scheduler;

pub use listeners::{Listeners, Subscription};
pub use scheduler::FrameScheduler;

use crate::buffer::CellBuffer;
use crate::color::Rgba;
use crate::error::Result;
use crate::event::{LogLevel, emit_log};
use crate::scene::{NodeId, RenderContext, SceneGraph, SharedScene};
use crate::terminal::{ResizeWatch, TerminalSession, poll_readable, terminal_size};
use std::io::{self, Read, Stdout, Write};
use std::os::unix::io::AsRawFd;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Longest the run loop sleeps when no frame is armed.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Destroy the engine when the quit sequence arrives.
    pub exit_on_ctrl_c: bool,
    pub use_alternate_screen: bool,
    pub use_mouse: bool,
    pub hide_cursor: bool,
    /// Put stdin into raw mode on start.
    pub use_raw_mode: bool,
    /// Install a SIGWINCH handler on start.
    pub watch_resize: bool,
    pub target_fps: u32,
    /// Colour every frame is cleared to.
    pub background_color: Rgba,
    /// Input that counts as the quit shortcut.
    pub quit_sequence: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            exit_on_ctrl_c: true,
            use_alternate_screen: true,
            use_mouse: true,
            hide_cursor: true,
            use_raw_mode: true,
            watch_resize: true,
            target_fps: 30,
            background_color: Rgba::BLACK,
            quit_sequence: "\x03".to_string(),
        }
    }
}

impl RendererConfig {
    /// No terminal mode switches and no signal handler; for in-memory
    /// writers and tests.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            use_alternate_screen: false,
            use_mouse: false,
            hide_cursor: false,
            use_raw_mode: false,
            watch_resize: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_exit_on_ctrl_c(mut self, on: bool) -> Self {
        self.exit_on_ctrl_c = on;
        self
    }

    #[must_use]
    pub fn with_alternate_screen(mut self, on: bool) -> Self {
        self.use_alternate_screen = on;
        self
    }

    #[must_use]
    pub fn with_mouse(mut self, on: bool) -> Self {
        self.use_mouse = on;
        self
    }

    #[must_use]
    pub fn with_hidden_cursor(mut self, on: bool) -> Self {
        self.hide_cursor = on;
        self
    }

    #[must_use]
    pub fn with_raw_mode(mut self, on: bool) -> Self {
        self.use_raw_mode = on;
        self
    }

    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background_color = color;
        self
    }

    #[must_use]
    pub fn with_quit_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.quit_sequence = sequence.into();
        self
    }
}

/// Rendering statistics.
#[derive(Clone, Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub last_frame_time: Duration,
    /// Cells that differed from the previous frame.
    pub last_frame_cells: usize,
    pub last_frame_bytes: usize,
    pub total_bytes: usize,
    /// Detached nodes released at the start of the last frame.
    pub last_released: usize,
}

/// What [`RenderEngine::handle_input`] did with a chunk of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Delivered to keypress listeners.
    Forwarded,
    /// The quit sequence arrived and the engine destroyed itself.
    Quit,
    /// The engine is destroyed; input was dropped.
    Ignored,
}

/// Terminal render loop around a [`SceneGraph`].
///
/// Lifecycle misuse is harmless: starting twice, or calling anything after
/// [`destroy`](Self::destroy), does nothing. Dropping the engine destroys it.
pub struct RenderEngine<W: Write> {
    config: RendererConfig,
    terminal: TerminalSession<W>,
    scene: SharedScene,
    scheduler: Rc<FrameScheduler>,
    width: u32,
    height: u32,
    current: CellBuffer,
    previous: Option<CellBuffer>,
    running: bool,
    destroyed: bool,
    resize_watch: Option<ResizeWatch>,
    keypress: Listeners<str>,
    resize: Listeners<(u32, u32)>,
    destroy: Listeners<()>,
    stats: RenderStats,
}

impl RenderEngine<Stdout> {
    /// Engine writing to stdout, sized to the attached terminal.
    pub fn stdout(config: RendererConfig) -> Result<Self> {
        let (width, height) = terminal_size()?;
        Self::new(io::stdout(), width, height, config)
    }
}

impl<W: Write> RenderEngine<W> {
    /// Create a stopped engine. Nothing is written until [`start`](Self::start).
    pub fn new(writer: W, width: u32, height: u32, config: RendererConfig) -> Result<Self> {
        let scheduler = Rc::new(FrameScheduler::new(config.target_fps));
        let mut scene = SceneGraph::new(width, height)?;
        scene.set_context(Some(Rc::clone(&scheduler) as Rc<dyn RenderContext>));
        Ok(Self {
            config,
            terminal: TerminalSession::new(writer),
            scene: scene.into_shared(),
            scheduler,
            width,
            height,
            current: CellBuffer::new(width, height),
            previous: None,
            running: false,
            destroyed: false,
            resize_watch: None,
            keypress: Listeners::new(),
            resize: Listeners::new(),
            destroy: Listeners::new(),
            stats: RenderStats::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Shared handle to the scene graph.
    #[must_use]
    pub fn scene(&self) -> SharedScene {
        Rc::clone(&self.scene)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.scene.borrow().root()
    }

    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Everything written so far, for in-memory writers.
    #[must_use]
    pub fn output(&self) -> &W {
        self.terminal.writer()
    }

    /// The last committed frame.
    #[must_use]
    pub fn previous_frame(&self) -> Option<&CellBuffer> {
        self.previous.as_ref()
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Raw input text, one call per chunk read.
    pub fn on_keypress(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        self.keypress.subscribe(callback)
    }

    /// New terminal size as `(width, height)`.
    pub fn on_resize(&self, callback: impl Fn(&(u32, u32)) + 'static) -> Subscription {
        self.resize.subscribe(callback)
    }

    /// Fired once during [`destroy`](Self::destroy), after the terminal is
    /// restored and before the listener lists are cleared.
    pub fn on_destroy(&self, callback: impl Fn(&()) + 'static) -> Subscription {
        self.destroy.subscribe(callback)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.keypress.unsubscribe(subscription)
            || self.resize.unsubscribe(subscription)
            || self.destroy.unsubscribe(subscription)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Switch the terminal into application mode and schedule the first frame.
    pub fn start(&mut self) -> Result<()> {
        if self.running || self.destroyed {
            return Ok(());
        }
        if self.config.use_raw_mode {
            self.terminal.enter_raw_mode()?;
        }
        if self.config.use_alternate_screen {
            self.terminal.enter_alt_screen()?;
        }
        if self.config.hide_cursor {
            self.terminal.hide_cursor()?;
        }
        if self.config.use_mouse {
            self.terminal.enable_mouse()?;
        }
        self.terminal.flush()?;
        if self.config.watch_resize {
            self.resize_watch = Some(ResizeWatch::install()?);
        }
        self.running = true;
        emit_log(
            LogLevel::Info,
            &format!("render engine started at {}x{}", self.width, self.height),
        );
        self.request_render();
        Ok(())
    }

    /// Restore the terminal and tear everything down. Idempotent.
    ///
    /// Terminal restoration runs in a fixed order and keeps going past
    /// write failures, so the terminal ends up usable whatever happened.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.running = false;
        self.scheduler.cancel();
        self.resize_watch = None;

        let steps: [(&str, fn(&mut TerminalSession<W>) -> io::Result<()>); 6] = [
            ("disable mouse", TerminalSession::disable_mouse),
            ("show cursor", TerminalSession::show_cursor),
            ("reset style", TerminalSession::reset_style),
            ("leave alternate screen", TerminalSession::leave_alt_screen),
            ("exit raw mode", TerminalSession::exit_raw_mode),
            ("flush", TerminalSession::flush),
        ];
        for (what, step) in steps {
            if let Err(e) = step(&mut self.terminal) {
                emit_log(LogLevel::Warn, &format!("terminal restore ({what}) failed: {e}"));
            }
        }

        let destroyed = {
            let mut scene = self.scene.borrow_mut();
            let root = scene.root();
            let destroyed = scene.destroy_recursively_deferred(root);
            scene.set_context(None);
            destroyed
        };
        destroyed.notify();
        if let Some(mut previous) = self.previous.take() {
            previous.release();
        }
        self.current.release();

        emit_log(LogLevel::Info, "render engine destroyed");
        self.destroy.emit(&());
        self.keypress.clear();
        self.resize.clear();
        self.destroy.clear();
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Schedule a frame one interval from now unless one is already armed.
    pub fn request_render(&self) {
        self.scheduler.request_render();
    }

    /// Run the armed frame if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.destroyed || !self.scheduler.take_due(now) {
            return Ok(false);
        }
        self.render_frame()?;
        Ok(true)
    }

    /// Lay out, paint, diff and write one frame now. Returns bytes written.
    ///
    /// A layout failure skips the frame and is logged; the previous frame
    /// stays the baseline.
    pub fn render_frame(&mut self) -> Result<usize> {
        if self.destroyed {
            return Ok(0);
        }
        let started = Instant::now();
        let (released, destroyed) = self.scene.borrow_mut().release_detached_deferred();
        destroyed.notify();

        self.current.clear(Some(self.config.background_color));
        if let Err(e) = self.scene.borrow_mut().render(&mut self.current) {
            emit_log(LogLevel::Error, &format!("frame skipped, layout failed: {e}"));
            return Ok(0);
        }

        let changed = self.current.count_changed(self.previous.as_ref());
        let bytes = self
            .current
            .write_ansi(self.terminal.writer_mut(), self.previous.as_ref())?;
        self.terminal.flush()?;

        let next = CellBuffer::new(self.width, self.height);
        self.previous = Some(std::mem::replace(&mut self.current, next));

        self.stats.frames += 1;
        self.stats.last_frame_time = started.elapsed();
        self.stats.last_frame_cells = changed;
        self.stats.last_frame_bytes = bytes;
        self.stats.total_bytes += bytes;
        self.stats.last_released = released;
        emit_log(
            LogLevel::Debug,
            &format!("frame {}: {changed} cells, {bytes} bytes", self.stats.frames),
        );
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // Input & resize
    // ------------------------------------------------------------------

    /// Deliver a chunk of raw input.
    ///
    /// The quit sequence destroys the engine when `exit_on_ctrl_c` is set
    /// and returns [`InputAction::Quit`]; anything else goes to keypress
    /// listeners verbatim. The process is never terminated here: the caller
    /// decides what quitting means, and [`run`](Self::run) returns `Ok(())`.
    pub fn handle_input(&mut self, bytes: &[u8]) -> InputAction {
        if self.destroyed {
            return InputAction::Ignored;
        }
        let text = String::from_utf8_lossy(bytes);
        if self.config.exit_on_ctrl_c && text == self.config.quit_sequence.as_str() {
            self.destroy();
            return InputAction::Quit;
        }
        self.keypress.emit(&text);
        InputAction::Forwarded
    }

    /// Adopt a new terminal size. Returns false when nothing changed.
    ///
    /// Both buffers are reallocated, so the next frame is a full repaint.
    pub fn handle_resize(&mut self, width: u32, height: u32) -> bool {
        if self.destroyed || (width == self.width && height == self.height) {
            return false;
        }
        emit_log(
            LogLevel::Debug,
            &format!(
                "resize {}x{} -> {width}x{height}",
                self.width, self.height
            ),
        );
        self.width = width;
        self.height = height;
        self.current = CellBuffer::new(width, height);
        if let Some(mut previous) = self.previous.take() {
            previous.release();
        }
        self.scene.borrow_mut().resize(width, height);
        self.resize.emit(&(width, height));
        self.request_render();
        true
    }

    /// Re-query the terminal size if SIGWINCH arrived since the last check.
    pub fn check_resize(&mut self) -> Result<bool> {
        let signalled = self
            .resize_watch
            .as_ref()
            .is_some_and(ResizeWatch::take_resized);
        if !signalled {
            return Ok(false);
        }
        let (width, height) = terminal_size()?;
        Ok(self.handle_resize(width, height))
    }

    /// Drive the engine from stdin on this thread until it is destroyed.
    ///
    /// Each turn waits for input no longer than the armed frame's deadline,
    /// then handles resize, input and the frame timer in that order.
    /// End of input destroys the engine.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut buf = [0_u8; 1024];
        while !self.destroyed {
            let timeout = self
                .scheduler
                .time_until_due(Instant::now())
                .unwrap_or(IDLE_POLL);
            let readable = poll_readable(fd, timeout)?;
            self.check_resize()?;
            if readable {
                let n = stdin.lock().read(&mut buf)?;
                if !self.feed(&buf[..n]) {
                    break;
                }
            }
            self.tick(Instant::now())?;
        }
        Ok(())
    }

    /// Hand one read to the engine. Returns false once the loop must stop,
    /// either at end of input or after the quit sequence.
    fn feed(&mut self, chunk: &[u8]) -> bool {
        if chunk.is_empty() {
            self.destroy();
            return false;
        }
        self.handle_input(chunk) != InputAction::Quit
    }
}

impl<W: Write> Drop for RenderEngine<W> {
    fn drop(&mut self) {
        self.destroy();
    }
}
