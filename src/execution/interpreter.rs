//! The interpreter: construction-time validation and the step loop.

use crate::catalog::{Behavior, InstructionCatalog};
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::execution::config::ExecutionConfig;
use crate::execution::context::ExecutionContext;
use crate::execution::errors::{InterpreterError, VMError};
use crate::execution::flow::FlowController;
use crate::execution::pins::Pins;
use crate::execution::registers::Registers;
use crate::execution::stack::{CallStack, StackFrame};
use crate::parsing::program::Program;
use crate::parsing::program_validator::ProgramValidator;
use crate::parsing::token::Token;
use crate::parsing::values::PinRange;
use crate::{debug, error, info, warn};

/// Register receiving the return address on calls.
const RA: &str = "ra";

/// Behavior and argument tokens of one instruction line, resolved up front.
struct Dispatch {
    behavior: Behavior,
    arguments: Vec<Token>,
}

/// Machine state reachable from instruction behaviors.
struct Machine {
    registers: Registers,
    stack_registers: Vec<String>,
    pins: Pins,
    stack: CallStack,
    flow: FlowController,
    program: Program,
}

impl ExecutionContext for Machine {
    fn current_line_index(&self) -> usize {
        self.flow.current()
    }

    fn push_frame(&mut self) -> Result<(), VMError> {
        let registers = self
            .stack_registers
            .iter()
            .map(|name| self.registers.get(name))
            .collect::<Result<Vec<_>, _>>()?;
        let return_address = self.flow.current() + 1;
        let ra = u16::try_from(return_address).map_err(|_| VMError::AddressOutOfRange {
            address: return_address,
        })?;

        self.stack.push(StackFrame {
            registers,
            return_address,
        })?;

        for name in &self.stack_registers {
            self.registers.set(name, 0)?;
        }
        self.registers.set(RA, ra)
    }

    fn pop_frame(&mut self) -> Result<usize, VMError> {
        let frame = self.stack.pop()?;
        for (name, value) in self.stack_registers.iter().zip(&frame.registers) {
            self.registers.set(name, *value)?;
        }
        // frames are only pushed with addresses that fit
        self.registers.set(RA, frame.return_address as u16)?;
        Ok(frame.return_address)
    }

    fn jump(&mut self, line_number: usize) {
        self.flow.jump(line_number);
    }

    fn jump_to_label(&mut self, label: &str) {
        match self.label_address(label) {
            Some(address) => self.flow.jump(address),
            None => {
                warn!("jump to unknown label \"{label}\" terminates the program");
                self.flow.terminate();
            }
        }
    }

    fn sleep(&mut self, steps: usize) {
        self.flow.sleep(steps);
    }

    fn label_address(&self, label: &str) -> Option<usize> {
        self.program.label_line(label).map(|index| index + 1)
    }

    fn register(&self, name: &str) -> Result<u16, VMError> {
        self.registers.get(name)
    }

    fn set_register(&mut self, name: &str, value: u16) -> Result<(), VMError> {
        self.registers.set(name, value)
    }

    fn set_pins(&mut self, range: PinRange, bits: &[bool]) -> Result<(), VMError> {
        self.pins.write_range(range, bits)
    }

    fn pins(&self, range: PinRange) -> Result<Vec<bool>, VMError> {
        self.pins.read_range(range)
    }
}

/// Executes a validated program one instruction line at a time.
///
/// Construction validates both the configuration and the program, so an
/// `Interpreter` never exists in an invalid state.
pub struct Interpreter {
    config: ExecutionConfig,
    dispatch: Vec<Option<Dispatch>>,
    machine: Machine,
    errors: Diagnostics,
    pending_steps: usize,
}

impl Interpreter {
    /// Validates `config` and `program` and prepares execution.
    ///
    /// Returns [`InterpreterError::InvalidConfig`] with every configuration
    /// problem, or [`InterpreterError::InvalidProgram`] with the validation
    /// diagnostics if the program has errors. Warnings are kept in
    /// [`errors`](Self::errors).
    pub fn new(
        config: ExecutionConfig,
        program: Program,
        catalog: &dyn InstructionCatalog,
    ) -> Result<Self, InterpreterError> {
        config.validate().map_err(InterpreterError::InvalidConfig)?;

        let diagnostics = ProgramValidator::new(&config, catalog).validate(&program);
        if !diagnostics.is_ok() {
            return Err(InterpreterError::InvalidProgram(diagnostics));
        }

        let dispatch = program
            .lines()
            .iter()
            .map(|line| {
                let name = line.instruction_name()?;
                let arguments = line.arguments();
                let kinds: Vec<_> = arguments.iter().map(Token::kind).collect();
                let definition = catalog.resolve(name, &kinds).ok()?;
                Some(Dispatch {
                    behavior: definition.behavior,
                    arguments,
                })
            })
            .collect();

        info!(
            "interpreter ready: {} instruction line(s), {} pin(s), stack depth {}",
            program.instruction_count(),
            config.pins(),
            config.stack_depth_limit()
        );

        let machine = Machine {
            registers: Registers::new(&config),
            stack_registers: config.stack_register_names().collect(),
            pins: Pins::new(config.pins()),
            stack: CallStack::new(config.stack_depth_limit()),
            flow: FlowController::new(&program),
            program,
        };

        Ok(Self {
            config,
            dispatch,
            machine,
            errors: diagnostics,
            pending_steps: 0,
        })
    }

    /// Advances execution by one step.
    ///
    /// Returns [`VMError::Faulted`] if an error was recorded earlier, and does
    /// nothing once terminated. A line executes once every
    /// `steps_per_instruction` steps; `slp` adds idle steps. Fatal errors are
    /// recorded in [`errors`](Self::errors) and returned; non-fatal ones are
    /// only recorded as warnings.
    pub fn step(&mut self) -> Result<(), VMError> {
        if !self.errors.is_ok() {
            warn!("step requested on a faulted interpreter");
            return Err(VMError::Faulted);
        }
        if self.machine.flow.is_terminated() {
            return Ok(());
        }
        if self.machine.flow.is_sleeping() {
            self.machine.flow.process_sleep();
            return Ok(());
        }

        self.machine.flow.update_current();
        self.pending_steps += 1;
        if self.pending_steps < self.config.steps() {
            return Ok(());
        }
        self.pending_steps = 0;

        let index = self.machine.flow.current();
        let result = self.execute_line(index);
        let fatal = matches!(&result, Err(err) if err.is_fatal());

        // a fatal fault leaves the faulting line as the next one
        if !fatal && !self.machine.flow.is_modified() {
            self.machine.flow.move_next();
        }
        self.machine.flow.reset();

        if self.machine.flow.is_terminated() {
            debug!("program terminated after line {index}");
        }

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.record(index, err),
        }
    }

    /// Steps until termination or until `max_steps` steps have been taken.
    ///
    /// Returns the number of steps taken.
    pub fn run(&mut self, max_steps: usize) -> Result<usize, VMError> {
        let mut taken = 0;
        while taken < max_steps && !self.is_terminated() {
            self.step()?;
            taken += 1;
        }
        Ok(taken)
    }

    fn execute_line(&mut self, index: usize) -> Result<(), VMError> {
        let Some(dispatch) = self.dispatch.get(index).and_then(Option::as_ref) else {
            return Err(VMError::NoDispatch { line: index });
        };
        (dispatch.behavior)(&mut self.machine, &dispatch.arguments)
    }

    fn record(&mut self, index: usize, err: VMError) -> Result<(), VMError> {
        let end_column = self.machine.program.line(index).map_or(0, |l| l.end_column());
        let severity = if err.is_fatal() {
            Severity::Error
        } else {
            Severity::Warning
        };
        self.errors.push(Diagnostic::new(
            err.to_string(),
            index,
            0,
            end_column,
            severity,
        ));

        if err.is_fatal() {
            error!("line {index}: {err}");
            Err(err)
        } else {
            warn!("line {index}: {err}");
            Ok(())
        }
    }

    // ==================== State queries ====================

    /// Current value of register `name`, or `None` if it does not exist.
    pub fn register(&self, name: &str) -> Option<u16> {
        self.machine.registers.get(name).ok()
    }

    /// Every register and its value, sorted by name.
    pub fn register_values(&self) -> Vec<(String, u16)> {
        self.machine.registers.snapshot()
    }

    pub fn has_register(&self, name: &str) -> bool {
        self.machine.registers.contains(name)
    }

    pub fn pins(&self) -> &Pins {
        &self.machine.pins
    }

    /// Mutable pin access for the host, typically to drive input pins.
    pub fn pins_mut(&mut self) -> &mut Pins {
        &mut self.machine.pins
    }

    pub fn stack_depth(&self) -> usize {
        self.machine.stack.depth()
    }

    /// Index of the line executed (or being delayed) by the latest step.
    pub fn current_line_index(&self) -> usize {
        self.machine.flow.current()
    }

    /// Index of the line the next step will move to, `None` once terminated.
    pub fn next_line_index(&self) -> Option<usize> {
        self.machine.flow.next()
    }

    pub fn is_terminated(&self) -> bool {
        self.machine.flow.is_terminated()
    }

    pub fn is_sleeping(&self) -> bool {
        self.machine.flow.is_sleeping()
    }

    pub fn errors(&self) -> &Diagnostics {
        &self.errors
    }

    pub fn program(&self) -> &Program {
        &self.machine.program
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }
}
