//! Todo API Example
//!
//! Serves a small todo list with typed handlers, the OpenAPI document at
//! `/openapi` and the Redoc viewer at `/docs`.
//!
//! Run with:
//! ```bash
//! cargo run -p ferrule-api --example todo_server
//! ```
//!
//! Then try:
//! ```bash
//! curl 'http://127.0.0.1:8000/todos/1?verbose=true'
//! curl -X POST http://127.0.0.1:8000/todos/ -d '{"title": "Write docs"}'
//! curl http://127.0.0.1:8000/openapi
//! ```

use ferrule_api::{
    init_logging, ApiConfig, Arguments, FieldDescriptor, Handler, HttpError, HttpStatus, LogConfig, Methods,
    ModelConfig, NotFoundError, Param, Reply, ResponseType, Server, ServerConfig, StructuredModel,
    TypeDescriptor, TypeRef, TypedApi, TypedBlueprint, TypedResource,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Todo {
    id: i64,
    title: String,
    done: bool,
}

impl StructuredModel for Todo {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object(
            "Todo",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::int()),
                FieldDescriptor::new("title", TypeDescriptor::string()),
                FieldDescriptor::new("done", TypeDescriptor::Bool),
            ],
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NewTodo {
    title: String,
}

impl StructuredModel for NewTodo {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object("NewTodo", vec![FieldDescriptor::new("title", TypeDescriptor::string())])
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Created {
    id: i64,
}

impl StructuredModel for Created {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::object("Created", vec![FieldDescriptor::new("id", TypeDescriptor::int())])
    }

    fn config() -> ModelConfig {
        ModelConfig {
            status_code: HttpStatus::CREATED.code(),
        }
    }
}

#[derive(Default)]
struct TodoItem;

impl TypedResource for TodoItem {
    fn methods(methods: &mut Methods<Self>) {
        methods.get(
            Handler::new(|_: &Self, args: &Arguments| {
                let id: i64 = args.get("todo_id")?;
                let verbose: bool = args.get("verbose")?;
                if id != 1 {
                    return Err(HttpError::new::<NotFoundError>().with_message(format!("No todo {}", id)));
                }
                Reply::model(&Todo {
                    id,
                    title: (if verbose { "Try ferrule (verbose)" } else { "Try ferrule" }).to_string(),
                    done: false,
                })
            })
            .doc(
                "Fetch a todo

                :param todo_id: Todo identifier
                :param verbose: Longer titles
                :return: The todo
                :raises NotFoundError: Unknown todo",
            )
            .param(Param::new("todo_id", TypeRef::int()))
            .param(Param::new("verbose", TypeRef::bool()).default(false))
            .returns(ResponseType::model::<Todo>())
            .returns(ResponseType::error::<NotFoundError>()),
        );
    }
}

#[derive(Default)]
struct TodoList;

impl TypedResource for TodoList {
    fn methods(methods: &mut Methods<Self>) {
        methods.post(
            Handler::new(|_: &Self, args: &Arguments| {
                let todo: NewTodo = args.get("todo")?;
                tracing::info!(title = %todo.title, "creating todo");
                Reply::model(&Created { id: 2 })
            })
            .doc("Create a todo\n\n:param todo: Todo to create\n:return: Identifier of the new todo")
            .param(Param::new("todo", TypeRef::model::<NewTodo>()))
            .returns(ResponseType::model::<Created>()),
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::new("info,ferrule_api=debug"));

    let mut todos = TypedBlueprint::new();
    todos
        .add_resource::<TodoList>("/")
        .add_resource::<TodoItem>("/<int:todo_id>");

    let mut api = TypedApi::new(ApiConfig::new("Todo API").version("v1.0.0"));
    api.register_blueprint(&todos, "/todos")?;

    Server::new(api, ServerConfig::new("127.0.0.1:8000")).run().await
}
