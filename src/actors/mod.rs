// Actor模块 - 使用Actor模式管理并发状态
//
// 用Actor模式替代Arc<Mutex<T>>，通过消息传递实现并发控制
// 传感器事件经由Actor串行处理，保证同一监听器的事件按顺序入账

pub mod listener_status;
pub mod step_listener;

pub use listener_status::{ListenerStatusActor, ListenerStatusCommand, ListenerStatusHandle};
pub use step_listener::{StepListenerActor, StepListenerCommand, StepListenerHandle};
