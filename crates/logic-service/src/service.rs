use crate::planner::plan_tasks;
use crate::rpc::{
    EvalReply, EvalRequest, HelloReply, HelloRequest, PlanReply, PlanRequest, RpcCall, RpcReply, TransformReply,
    TransformRequest,
};
use logic_expr::{
    evaluate_expression, transform_with, EvalError, Execution, ExpressionError, TransformError, TransformOp,
    TransformOutput,
};
use tracing::{debug, info};

pub const DEFAULT_VAR_NAME: &str = "x";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Element variable used when a transform request leaves `var_name` blank.
    pub default_var_name: String,
    /// Transforms over at least this many elements run on the rayon pool.
    pub parallel_threshold: Option<usize>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_var_name: DEFAULT_VAR_NAME.to_string(),
            parallel_threshold: None,
        }
    }
}

/// Request handlers. Every failure becomes an `error` string on the reply.
#[derive(Debug, Clone, Default)]
pub struct LogicService {
    options: ServiceOptions,
}

impl LogicService {
    pub fn new(options: ServiceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn handle(&self, call: &RpcCall) -> RpcReply {
        match call {
            RpcCall::Hello(request) => RpcReply::Hello(self.hello(request)),
            RpcCall::Evaluate(request) => RpcReply::Evaluate(self.evaluate(request)),
            RpcCall::Transform(request) => RpcReply::Transform(self.transform(request)),
            RpcCall::PlanTasks(request) => RpcReply::PlanTasks(self.plan_tasks(request)),
        }
    }

    pub fn hello(&self, request: &HelloRequest) -> HelloReply {
        let name = if request.name.is_empty() {
            "there"
        } else {
            request.name.as_str()
        };
        info!(name, "hello");
        HelloReply {
            message: format!("Hello, {name} from LogicService!"),
        }
    }

    pub fn evaluate(&self, request: &EvalRequest) -> EvalReply {
        let expression = request.expression.trim();
        info!(expression, variables = request.variables.len(), "evaluate");

        if expression.is_empty() {
            return eval_failure("expression is empty");
        }
        let reply = match evaluate_expression(expression, &request.variables) {
            Ok(value) if !value.is_finite() => eval_failure("result is not finite (NaN/Inf)"),
            Ok(value) => EvalReply {
                result: Some(value),
                error: None,
            },
            Err(error) => eval_failure(expression_error_message(&error)),
        };
        debug!(?reply, "evaluate reply");
        reply
    }

    pub fn transform(&self, request: &TransformRequest) -> TransformReply {
        let expr = request.expr.trim();
        let var_name = match request.var_name.trim() {
            "" => self.options.default_var_name.as_str(),
            name => name,
        };
        info!(
            op = request.op.as_str(),
            expr,
            var_name,
            data_len = request.data.len(),
            "transform"
        );

        if expr.is_empty() {
            return transform_failure("expr is empty");
        }
        let op = match request.op.parse::<TransformOp>() {
            Ok(op) => op,
            Err(_) => return transform_failure("unsupported op"),
        };
        let execution = self.execution_for(request.data.len());

        let reply = match transform_with(op, &request.data, expr, var_name, execution) {
            Ok(TransformOutput::Data(data)) => TransformReply {
                data: Some(data),
                ..TransformReply::default()
            },
            Ok(TransformOutput::Scalar(total)) => TransformReply {
                result: Some(total),
                ..TransformReply::default()
            },
            Err(error) => transform_failure(transform_error_message(&error)),
        };
        debug!(error = reply.error.as_deref(), "transform reply");
        reply
    }

    pub fn plan_tasks(&self, request: &PlanRequest) -> PlanReply {
        let goal = request.goal.trim();
        info!(goal, hints = ?request.hints, max_steps = ?request.max_steps, "plan_tasks");

        match plan_tasks(goal, &request.hints, request.max_steps) {
            Ok(outcome) => PlanReply {
                tasks: outcome.tasks,
                notes: outcome.notes,
                error: None,
            },
            Err(error) => PlanReply {
                error: Some(error.to_string()),
                ..PlanReply::default()
            },
        }
    }

    fn execution_for(&self, len: usize) -> Execution {
        match self.options.parallel_threshold {
            Some(threshold) if len >= threshold => Execution::Parallel,
            _ => Execution::Sequential,
        }
    }
}

fn eval_failure(message: impl Into<String>) -> EvalReply {
    EvalReply {
        result: None,
        error: Some(message.into()),
    }
}

fn transform_failure(message: impl Into<String>) -> TransformReply {
    TransformReply {
        error: Some(message.into()),
        ..TransformReply::default()
    }
}

// Division by zero reaches the caller as the bare condition, without the
// element or expression context the other errors carry.
fn expression_error_message(error: &ExpressionError) -> String {
    match error.eval_error() {
        Some(EvalError::DivisionByZero) => EvalError::DivisionByZero.to_string(),
        _ => error.to_string(),
    }
}

fn transform_error_message(error: &TransformError) -> String {
    match error.eval_error() {
        Some(EvalError::DivisionByZero) => EvalError::DivisionByZero.to_string(),
        _ => error.to_string(),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
