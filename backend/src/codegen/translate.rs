use frontend::ast::symtab::SymbolTable;
use frontend::ast::{BinaryOp, FunctionDecl, Node, Type};
use tracing::debug;

use super::call::frame_size;
use super::CodeGenerator;
use crate::error::{CodegenError, CodegenResult};
use crate::tm::instruction::Opcode;
use crate::tm::instruction::Register::*;

/// What a variable or array element reference leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
  /// Value in `ax`.
  Value,
  /// Address in `bx` only.
  Address,
}

impl<'a> CodeGenerator<'a> {
  pub(crate) fn build_declaration(&mut self, node: &'a Node) -> CodegenResult<()> {
    match node {
      Node::FunctionDecl(function) => self.build_function(function),
      other => Err(CodegenError::UnexpectedNode {
        kind: other.kind(),
        context: "top level",
      }),
    }
  }

  fn build_function(&mut self, function: &'a FunctionDecl) -> CodegenResult<()> {
    let program = self.program;
    let symbol = program
      .function(&function.name)
      .ok_or_else(|| CodegenError::UnknownFunction(function.name.clone()))?;

    self.stream.comment("-> function:");
    // Fixed before the body so that recursive calls resolve.
    let entry = self.define_entry(&function.name, symbol.param_count())?;
    let locals = frame_size(&function.body);
    debug!(
      name = %function.name,
      address = entry.address,
      locals,
      "building function"
    );

    self.emit_prologue(locals);

    self.scopes.push(&symbol.params);
    self.build_statement(&function.body)?;
    self.scopes.pop();

    if function.return_type == Type::Void {
      self.emit_epilogue();
    }
    self.stream.comment("<- function");
    Ok(())
  }

  pub(crate) fn build_statement(&mut self, node: &'a Node) -> CodegenResult<()> {
    match node {
      Node::FunctionDecl(_) => Err(CodegenError::UnexpectedNode {
        kind: node.kind(),
        context: "function body",
      }),
      Node::Compound(scope, statements) => self.build_compound(scope.as_ref(), statements),
      Node::If(test, then_stmt, else_stmt) => {
        self.build_if_statement(test, then_stmt, else_stmt.as_deref())
      }
      Node::While(test, body) => self.build_while_statement(test, body),
      Node::Return(return_type, value) => self.build_return(*return_type, value.as_deref()),
      expression => self.build_expression(expression, Access::Value),
    }
  }

  fn build_compound(
    &mut self,
    scope: Option<&'a SymbolTable>,
    statements: &'a [Node],
  ) -> CodegenResult<()> {
    self.stream.comment("-> compound");
    if let Some(table) = scope {
      self.scopes.push(table);
    }
    for statement in statements {
      self.build_statement(statement)?;
    }
    if scope.is_some() {
      self.scopes.pop();
    }
    self.stream.comment("<- compound");
    Ok(())
  }

  fn build_if_statement(
    &mut self,
    test: &'a Node,
    then_stmt: &'a Node,
    else_stmt: Option<&'a Node>,
  ) -> CodegenResult<()> {
    self.stream.comment("-> if");
    self.build_expression(test, Access::Value)?;
    let to_else = self.stream.reserve(1);
    self.stream.comment("jump to else");

    self.build_statement(then_stmt)?;
    let to_end = self.stream.reserve(1);
    self.stream.comment("jump to end");

    let else_start = self.stream.reserve(0);
    self.stream.rewind(to_else)?;
    self
      .stream
      .emit_rm(Opcode::Jeq, Ax, else_start as i32, Zero, "if: jmp to else");
    self.stream.resume();

    if let Some(else_stmt) = else_stmt {
      self.build_statement(else_stmt)?;
    }
    let end = self.stream.reserve(0);
    self.stream.rewind(to_end)?;
    self.stream.emit_rm(Opcode::Lda, Pc, end as i32, Zero, "jmp to end");
    self.stream.resume();
    self.stream.comment("<- if");
    Ok(())
  }

  fn build_while_statement(&mut self, test: &'a Node, body: &'a Node) -> CodegenResult<()> {
    self.stream.comment("-> while");
    let loop_test = self.stream.reserve(0);
    self.stream.comment("jump here after body");
    self.build_expression(test, Access::Value)?;
    let to_end = self.stream.reserve(1);
    self.stream.comment("jump to end if test fails");

    self.build_statement(body)?;
    self
      .stream
      .emit_rm(Opcode::Lda, Pc, loop_test as i32, Zero, "jump to test");

    let end = self.stream.reserve(0);
    self.stream.rewind(to_end)?;
    self.stream.emit_rm(Opcode::Jeq, Ax, end as i32, Zero, "jump to end");
    self.stream.resume();
    self.stream.comment("<- while");
    Ok(())
  }

  fn build_return(&mut self, return_type: Type, value: Option<&'a Node>) -> CodegenResult<()> {
    self.stream.comment("-> return");
    if return_type != Type::Void {
      if let Some(value) = value {
        self.build_expression(value, Access::Value)?;
      }
    }
    self.emit_epilogue();
    self.stream.comment("<- return");
    Ok(())
  }

  pub(crate) fn build_expression(&mut self, node: &'a Node, access: Access) -> CodegenResult<()> {
    match node {
      Node::Number(value) => {
        self.stream.emit_rm(Opcode::Ldc, Ax, *value, Ax, "store number");
        Ok(())
      }
      Node::Var(name) => {
        let var = self.build_address(name)?;
        if access == Access::Value {
          self.build_load(&var);
        }
        Ok(())
      }
      Node::ArrayElement(name, index) => self.build_array_element(name, index, access),
      Node::Assign(target, value) => self.build_assignment(target, value),
      Node::Binary(op, lhs, rhs) => self.build_binary_expression(*op, lhs, rhs),
      Node::Call(name, args) => {
        self.stream.comment("-> call");
        self.build_call(name, args)?;
        self.stream.comment("<- call");
        Ok(())
      }
      other => Err(CodegenError::UnexpectedNode {
        kind: other.kind(),
        context: "expression",
      }),
    }
  }

  fn build_array_element(
    &mut self,
    name: &str,
    index: &'a Node,
    access: Access,
  ) -> CodegenResult<()> {
    self.stream.comment("-> array element");
    self.build_address(name)?;
    self.push(Bx, "protect array address");
    self.build_expression(index, Access::Value)?;
    self.pop(Bx, "recover array address");

    // Arrays grow towards lower addresses.
    self
      .stream
      .emit_ro(Opcode::Sub, Bx, Bx, Ax, "get address of array element");
    if access == Access::Value {
      self.stream.emit_rm(Opcode::Ld, Ax, 0, Bx, "get value of array element");
    }
    self.stream.comment("<- array element");
    Ok(())
  }

  fn build_assignment(&mut self, target: &'a Node, value: &'a Node) -> CodegenResult<()> {
    if !matches!(target, Node::Var(_) | Node::ArrayElement(_, _)) {
      return Err(CodegenError::UnexpectedNode {
        kind: target.kind(),
        context: "assignment target",
      });
    }
    self.stream.comment("-> assign");
    self.build_expression(target, Access::Address)?;
    self.push(Bx, "protect bx");
    self.build_expression(value, Access::Value)?;
    self.pop(Bx, "recover bx");
    self.stream.emit_rm(Opcode::St, Ax, 0, Bx, "assign: store");
    self.stream.comment("<- assign");
    Ok(())
  }

  fn build_binary_expression(
    &mut self,
    op: BinaryOp,
    lhs: &'a Node,
    rhs: &'a Node,
  ) -> CodegenResult<()> {
    self.stream.comment("-> op");
    self.build_expression(lhs, Access::Value)?;
    self.push(Ax, "op: protect left");
    self.build_expression(rhs, Access::Value)?;
    self.pop(Bx, "op: recover left");

    let comment = format!("op {}", op.symbol());
    match op {
      BinaryOp::Add => self.stream.emit_ro(Opcode::Add, Ax, Bx, Ax, &comment),
      BinaryOp::Sub => self.stream.emit_ro(Opcode::Sub, Ax, Bx, Ax, &comment),
      BinaryOp::Mul => self.stream.emit_ro(Opcode::Mul, Ax, Bx, Ax, &comment),
      BinaryOp::Div => self.stream.emit_ro(Opcode::Div, Ax, Bx, Ax, &comment),
      BinaryOp::Equal => self.build_boolean(Opcode::Jeq, &comment),
      BinaryOp::NotEqual => self.build_boolean(Opcode::Jne, &comment),
      BinaryOp::LessThan => self.build_boolean(Opcode::Jlt, &comment),
      BinaryOp::GreaterThan => self.build_boolean(Opcode::Jgt, &comment),
      BinaryOp::LessOrEqual => self.build_boolean(Opcode::Jle, &comment),
      BinaryOp::GreaterOrEqual => self.build_boolean(Opcode::Jge, &comment),
    }
    self.stream.comment("<- op");
    Ok(())
  }

  /// Turns the sign of `bx - ax` into 0 or 1: branch over the false case to
  /// the true case.
  fn build_boolean(&mut self, branch: Opcode, comment: &str) {
    self.stream.emit_ro(Opcode::Sub, Ax, Bx, Ax, comment);
    self.stream.emit_rm(branch, Ax, 2, Pc, "br if true");
    self.stream.emit_rm(Opcode::Ldc, Ax, 0, Ax, "false case");
    self.stream.emit_rm(Opcode::Lda, Pc, 1, Pc, "unconditional jmp");
    self.stream.emit_rm(Opcode::Ldc, Ax, 1, Ax, "true case");
  }
}
