//! Sample tools served by the `toolhost` binary.

use serde_json::{json, Value};

use super::args::InvocationArgs;
use super::handler::{sync_handler, HandlerResult};
use super::registry::{Tool, ToolRegistry};
use crate::models::schema::Schema;

/// Registry holding `greet`, `add` and `echo`.
#[must_use]
pub fn registry() -> ToolRegistry {
    ToolRegistry::builder()
        .tool(greet())
        .tool(add())
        .tool(echo())
        .build()
}

/// `greet {name}`: one declared property, so the handler receives the name itself.
#[must_use]
pub fn greet() -> Tool {
    Tool::new(
        "greet",
        sync_handler(|args| {
            let name: String = args.parse()?;
            Ok(Value::String(format!("Hello, {name}!")))
        }),
    )
    .with_schema(Schema::object().field("name", Schema::string().describe("Who to greet")))
}

/// `add {a, b}`: two declared properties, received positionally.
#[must_use]
pub fn add() -> Tool {
    Tool::new(
        "add",
        |args: InvocationArgs| async move {
            let (a, b): (f64, f64) = args.parse()?;
            HandlerResult::Ok(json!({ "sum": a + b }))
        },
    )
    .with_description("Add two numbers")
    .with_schema(
        Schema::object()
            .field("a", Schema::number().describe("First addend"))
            .field("b", Schema::number().describe("Second addend")),
    )
}

/// `echo`: no schema, returns its input unvalidated.
#[must_use]
pub fn echo() -> Tool {
    Tool::new(
        "echo",
        sync_handler(|args| Ok(args.into_vec().into_iter().next().unwrap_or(Value::Null))),
    )
    .with_description("Return the arguments unchanged")
}
