//! # Actor System
//!
//! A minimal in-process actor system: each activation has a mailbox, runs on
//! its own task and processes one message per turn through a middleware
//! pipeline. Grains are actors with a cluster identity bound to their context.

pub mod context;
pub mod handle;
pub mod middleware;
pub mod props;
pub mod receiver;
pub mod runtime;
pub mod system;
pub mod types;

pub use context::ActorContext;
pub use handle::ActorRef;
pub use middleware::{Next, Pipeline, Receiver, ReceiverMiddleware};
pub use props::Props;
pub use receiver::{Actor, ActorCell};
pub use runtime::ActorRuntime;
pub use system::ActorSystem;
pub use types::{ActorControl, ActorError, Continuation, Envelope, Message, Signal};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ShutdownType;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        count: u32,
    }

    #[async_trait]
    impl Actor for Recorder {
        async fn receive(&mut self, ctx: &mut ActorContext, message: Message) -> Result<(), ActorError> {
            let entry = match message {
                Message::Started => "started".to_string(),
                Message::Stopped => "stopped".to_string(),
                Message::User(payload) => match payload.downcast::<&'static str>() {
                    Ok(text) if *text == "stop" => {
                        ctx.stop();
                        "stop".to_string()
                    }
                    Ok(text) if *text == "defer" => {
                        ctx.reenter_after(
                            tokio::time::sleep(Duration::from_millis(10)),
                            |recorder: &mut Recorder, (), _ctx| {
                                recorder.count += 1;
                                recorder.log.lock().unwrap().push(format!("resumed {}", recorder.count));
                            },
                        );
                        "defer".to_string()
                    }
                    Ok(text) => text.to_string(),
                    Err(_) => return Err(ActorError::Failed("unexpected payload".into())),
                },
                other => format!("{:?}", other),
            };
            self.log.lock().unwrap().push(entry);
            Ok(())
        }
    }

    fn recorder_props(log: &Arc<Mutex<Vec<String>>>) -> Props {
        let log = log.clone();
        Props::from_producer(move || Recorder {
            log: log.clone(),
            count: 0,
        })
    }

    #[tokio::test]
    async fn stop_delivers_stopped_last() {
        let system = ActorSystem::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));
        let actor = system.spawn(&recorder_props(&log)).unwrap();

        actor.tell("one").unwrap();
        actor.tell("two").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        actor.stop().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["started", "one", "two", "stopped"]);
        assert!(!actor.is_alive());
        assert_eq!(actor.tell("late"), Err(ActorError::MailboxClosed));
    }

    #[tokio::test]
    async fn actor_can_stop_itself() {
        let system = ActorSystem::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));
        let actor = system.spawn(&recorder_props(&log)).unwrap();

        actor.tell("stop").unwrap();
        while actor.is_alive() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(*log.lock().unwrap(), vec!["started", "stop", "stopped"]);
    }

    #[tokio::test(start_paused = true)]
    async fn continuation_runs_on_a_later_turn() {
        let system = ActorSystem::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));
        let actor = system.spawn(&recorder_props(&log)).unwrap();

        actor.tell("defer").unwrap();
        actor.tell("after").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["started", "defer", "after", "resumed 1"]
        );
    }

    #[tokio::test]
    async fn graceful_shutdown_drains_mailbox() {
        let system = ActorSystem::new("test");
        let log = Arc::new(Mutex::new(Vec::new()));
        let actor = system.spawn(&recorder_props(&log)).unwrap();
        actor.tell("queued").unwrap();

        system.shutdown(ShutdownType::Graceful).await;

        let log = log.lock().unwrap().clone();
        assert_eq!(log.first().map(String::as_str), Some("started"));
        assert!(log.contains(&"queued".to_string()));
        assert_eq!(log.last().map(String::as_str), Some("stopped"));
        assert!(system.spawn(&recorder_props(&Arc::default())).is_err());
    }

    #[test]
    fn props_list_middleware_in_order() {
        struct Named(&'static str);

        #[async_trait]
        impl ReceiverMiddleware for Named {
            fn name(&self) -> &str {
                self.0
            }

            async fn receive(
                &self,
                ctx: &mut ActorContext,
                envelope: Envelope,
                next: &mut Next<'_>,
            ) -> Result<(), ActorError> {
                next.run(ctx, envelope).await
            }
        }

        let props = recorder_props(&Arc::default())
            .with_receiver_middleware(Named("outer"))
            .with_receiver_middleware(Named("inner"));
        assert_eq!(props.middleware_names(), vec!["outer", "inner"]);
    }
}
