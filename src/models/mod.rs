pub mod todo;
pub mod user;

pub use todo::{
    parse_todo_id, CreateTodoRequest, NewTodo, Priority, Todo, TodoPatch, TodoQuery,
    UpdateTodoRequest,
};
pub use user::{NewUser, User, UserResponse};
