//! Messages from background tasks to the frame loop
//!
//! Loader and spawner threads never touch the scene graph. They describe the
//! change they want as a [`SceneCommand`] and the frame loop applies it at
//! the start of the next tick.

use std::{thread, time::Duration};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::debug;

use crate::gfx::{resources::TextureImage, scene::NodeId};

use super::artwork::{ArtworkRecord, Placement};

pub enum SceneCommand {
    /// An artwork image finished loading; build and register its entity
    ArtworkLoaded {
        record: ArtworkRecord,
        placement: Placement,
        image: TextureImage,
    },
    /// Texture for an existing mesh node
    TextureLoaded { target: NodeId, image: TextureImage },
    SpawnShootingStar,
}

pub type CommandSender = UnboundedSender<SceneCommand>;

/// Receiving end owned by the frame loop
pub struct CommandQueue {
    sender: CommandSender,
    receiver: UnboundedReceiver<SceneCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Takes every command queued so far without blocking
    pub fn drain(&mut self) -> Vec<SceneCommand> {
        let mut commands = Vec::new();
        while let Ok(Some(command)) = self.receiver.try_next() {
            commands.push(command);
        }
        commands
    }
}

/// Sends `make()` every `period` until the queue is dropped
pub fn spawn_interval<F>(
    sender: CommandSender,
    period: Duration,
    make: F,
) -> std::io::Result<thread::JoinHandle<()>>
where
    F: Fn() -> SceneCommand + Send + 'static,
{
    thread::Builder::new()
        .name("gallery-interval".to_string())
        .spawn(move || loop {
            thread::sleep(period);
            if sender.unbounded_send(make()).is_err() {
                debug!("Command queue closed, stopping interval");
                break;
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_commands_in_order() {
        let mut queue = CommandQueue::new();
        let sender = queue.sender();
        sender.unbounded_send(SceneCommand::SpawnShootingStar).unwrap();
        sender
            .unbounded_send(SceneCommand::TextureLoaded {
                target: crate::gfx::scene::SceneNode::group("g").id(),
                image: TextureImage::solid(1, 1, [0; 4]),
            })
            .unwrap();

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], SceneCommand::SpawnShootingStar));
        assert!(matches!(drained[1], SceneCommand::TextureLoaded { .. }));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_interval_stops_when_queue_dropped() {
        let queue = CommandQueue::new();
        let handle = spawn_interval(queue.sender(), Duration::from_millis(5), || {
            SceneCommand::SpawnShootingStar
        })
        .unwrap();
        drop(queue);
        handle.join().unwrap();
    }

    #[test]
    fn test_interval_delivers() {
        let mut queue = CommandQueue::new();
        let _handle = spawn_interval(queue.sender(), Duration::from_millis(2), || {
            SceneCommand::SpawnShootingStar
        })
        .unwrap();
        let mut received = 0;
        for _ in 0..500 {
            received += queue.drain().len();
            if received > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(received > 0);
    }
}
