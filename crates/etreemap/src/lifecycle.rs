//! Host-side lifecycle of one rendered code block.
//!
//! The host creates a [`RenderChild`] when it meets a treemap block, fires `ready` once the
//! container can be measured, pushes [`Refresh`] requests when settings or the pane size change,
//! and fires `teardown` when the block is unloaded.

use crate::render::{HeadlessRenderer, Rendered, Viewport};
use etreemap_core::TreemapSettings;
use futures::channel::{mpsc, oneshot};
use futures::{FutureExt, StreamExt};
use std::sync::Arc;

/// A request to draw the block again.
#[derive(Debug, Clone)]
pub enum Refresh {
    /// Plugin settings were edited.
    Defaults(Arc<TreemapSettings>),
    /// The host pane changed size.
    Resize(Viewport),
    /// The code block text changed.
    Source(String),
    /// Draw again with the current inputs.
    Redraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The ready signal was dropped before it fired; nothing was drawn.
    Canceled,
    /// Teardown fired (or its sender was dropped), or every refresh sender went away.
    TornDown,
}

/// The host's ends of the channels driving a [`RenderChild`].
#[derive(Debug)]
pub struct ChildHandles {
    pub ready: oneshot::Sender<()>,
    pub refresh: mpsc::UnboundedSender<Refresh>,
    pub teardown: oneshot::Sender<()>,
}

#[derive(Debug)]
pub struct RenderChild {
    renderer: HeadlessRenderer,
    source: String,
    diagram_id: String,
    ready: oneshot::Receiver<()>,
    refresh: mpsc::UnboundedReceiver<Refresh>,
    teardown: oneshot::Receiver<()>,
}

impl RenderChild {
    pub fn new(
        renderer: HeadlessRenderer,
        source: impl Into<String>,
        diagram_id: impl Into<String>,
    ) -> (Self, ChildHandles) {
        let (ready_tx, ready) = oneshot::channel();
        let (refresh_tx, refresh) = mpsc::unbounded();
        let (teardown_tx, teardown) = oneshot::channel();
        let child = Self {
            renderer,
            source: source.into(),
            diagram_id: diagram_id.into(),
            ready,
            refresh,
            teardown,
        };
        let handles = ChildHandles {
            ready: ready_tx,
            refresh: refresh_tx,
            teardown: teardown_tx,
        };
        (child, handles)
    }

    /// Waits for the surface, draws, then draws again once per batch of pending refresh
    /// requests until teardown. Every drawing is handed to `emit`.
    ///
    /// Only requests already queued when a batch starts are merged. Hosts that see bursts
    /// spread over time (pane resizes) should use [`RenderChild::run_debounced`].
    pub async fn run<F>(self, emit: F) -> Exit
    where
        F: FnMut(Rendered),
    {
        self.run_debounced(|| futures::future::ready(()), emit).await
    }

    /// Like [`RenderChild::run`], but after a request arrives the child waits for `settle()`
    /// before drawing. Each further request restarts the wait, so a burst draws once.
    /// `settle` is usually a host timer.
    pub async fn run_debounced<S, Fut, F>(self, mut settle: S, mut emit: F) -> Exit
    where
        S: FnMut() -> Fut,
        Fut: std::future::Future<Output = ()>,
        F: FnMut(Rendered),
    {
        let Self {
            mut renderer,
            mut source,
            diagram_id,
            ready,
            mut refresh,
            teardown,
        } = self;
        let mut ready = ready.fuse();
        let mut teardown = teardown.fuse();

        futures::select! {
            signal = ready => {
                if signal.is_err() {
                    tracing::debug!(diagram_id = %diagram_id, "ready signal canceled");
                    return Exit::Canceled;
                }
            }
            _ = teardown => return Exit::TornDown,
        }

        emit(renderer.render_document_sync(&source, &diagram_id));

        loop {
            let request = futures::select! {
                request = refresh.next() => request,
                _ = teardown => None,
            };
            let Some(request) = request else {
                return Exit::TornDown;
            };

            apply(&mut renderer, &mut source, request);
            let mut batched = 1usize;
            let mut closed = false;
            let mut settled = Box::pin(settle()).fuse();
            loop {
                futures::select_biased! {
                    _ = teardown => return Exit::TornDown,
                    request = refresh.next() => match request {
                        Some(request) => {
                            apply(&mut renderer, &mut source, request);
                            batched += 1;
                            settled = Box::pin(settle()).fuse();
                        }
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    () = settled => break,
                }
            }
            tracing::debug!(diagram_id = %diagram_id, batched, "re-rendering treemap");
            emit(renderer.render_document_sync(&source, &diagram_id));
            if closed {
                return Exit::TornDown;
            }
        }
    }
}

fn apply(renderer: &mut HeadlessRenderer, source: &mut String, request: Refresh) {
    match request {
        Refresh::Defaults(defaults) => renderer.defaults = defaults,
        Refresh::Resize(viewport) => renderer.viewport = Some(viewport),
        Refresh::Source(text) => *source = text,
        Refresh::Redraw => {}
    }
}
