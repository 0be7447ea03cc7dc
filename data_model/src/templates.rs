//! Canned handler sources used to seed a new draft.
//!
//! Each template matches the handler contract of the backend runtime for
//! that language: Python exposes `handler(event, ctx)` and Go exposes
//! `Handle(Event, Context) (Result, error)` inside `package main`.

pub const PYTHON_TEMPLATE: &str = r#"def handler(event, ctx):
    """
    This function is the entry point for the function.
    It will be invoked by the FaaS platform.
    """
    return {
        "statusCode": 200,
        "message": "Hello World",
        "function_id": ctx.function_id,
        "request_id": ctx.request_id,
        "path": event.path,
    }
"#;

pub const GO_TEMPLATE: &str = r#"package main

// Handle is the entry point for the function.
// It will be invoked by the FaaS platform.
func Handle(ev Event, ctx Context) (Result, error) {
	return Result{
		StatusCode: 200,
		Body: map[string]any{
			"message":     "Hello World",
			"function_id": ctx.FunctionID,
			"request_id":  ctx.RequestID,
			"path":        ev.Path,
		},
	}, nil
}
"#;
