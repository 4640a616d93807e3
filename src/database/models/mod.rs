pub mod reply;
pub mod topic;
pub mod user;

pub use reply::{NewReply, Reply};
pub use topic::{ForumStats, NewTopic, Topic, TopicStatus, TopicUpdate};
pub use user::{NewUser, User, UserView};
