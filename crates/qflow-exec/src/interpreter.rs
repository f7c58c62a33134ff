//! Tree-walking interpreter.

use qflow_ir::{Circuit, Condition, Node};
use qflow_sim::Simulator;
use tracing::debug;

use crate::context::ExecContext;
use crate::error::{ExecError, ExecResult};

/// Execute `circuit` once against `ctx`.
///
/// Stops at the first error; the context is left as it was at that point.
pub fn execute<S: Simulator>(circuit: &Circuit, ctx: &mut ExecContext<S>) -> ExecResult<()> {
    for node in circuit.nodes() {
        execute_node(node, ctx)?;
    }
    Ok(())
}

fn execute_node<S: Simulator>(node: &Node, ctx: &mut ExecContext<S>) -> ExecResult<()> {
    match node {
        Node::Block(block) => ctx.run_block(block)?,

        Node::If { cond, body } => {
            if eval_cond(cond, ctx)? {
                execute(body, ctx)?;
            }
        }

        Node::While {
            cond,
            body,
            max_iterations,
        } => {
            let mut iterations: u32 = 0;
            while eval_cond(cond, ctx)? {
                iterations += 1;
                if iterations > *max_iterations {
                    return Err(ExecError::IterationBudgetExceeded {
                        kind: "While",
                        max_iterations: *max_iterations,
                    });
                }
                execute(body, ctx)?;
            }
            debug!(iterations, "While loop finished");
        }

        Node::DoWhile {
            cond,
            body,
            max_iterations,
        } => {
            let mut iterations: u32 = 0;
            loop {
                iterations += 1;
                if iterations > *max_iterations {
                    return Err(ExecError::IterationBudgetExceeded {
                        kind: "DoWhile",
                        max_iterations: *max_iterations,
                    });
                }
                execute(body, ctx)?;
                if !eval_cond(cond, ctx)? {
                    break;
                }
            }
            debug!(iterations, "DoWhile loop finished");
        }

        Node::Let { name, expr } => {
            let value = expr.eval(&*ctx)?;
            ctx.bind(name, value);
        }

        Node::Emit { expr, name } => {
            let bit = expr.eval(&*ctx)?.truthy();
            ctx.push_output(bit, name.as_deref());
        }
    }
    Ok(())
}

fn eval_cond<S: Simulator>(cond: &Condition, ctx: &ExecContext<S>) -> ExecResult<bool> {
    Ok(cond.eval(ctx)?)
}
