//! Draw commands, pass ordering, and the per-frame command buffer.

use static_assertions::const_assert_eq;
use stratum_cull::BoundingSphere;

/// Execution-order category for a draw command.
///
/// Declaration order is execution order within a frustum slice. [`Pass::Overlay`]
/// is special: overlay commands are never frustum-binned and run once,
/// unculled, after all slices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Pass {
    /// Opaque ground/terrain geometry. Drawn first within a slice.
    Globe = 0,
    /// Geometry draped on or near the ground.
    Ground = 1,
    /// General opaque geometry. Clear-type commands also bucket here.
    Opaque = 2,
    /// Blended geometry, drawn back-to-front after all opaque passes.
    Translucent = 3,
    /// Screen-space overlays, drawn once after all slices.
    Overlay = 4,
}

impl Pass {
    /// Number of passes.
    pub const COUNT: usize = 5;

    /// Passes that participate in frustum binning, in execution order.
    pub const BINNED: [Pass; 4] = [Pass::Globe, Pass::Ground, Pass::Opaque, Pass::Translucent];

    /// Bucket index for this pass.
    pub fn index(self) -> usize {
        self as usize
    }
}

const_assert_eq!(Pass::Overlay as usize, Pass::COUNT - 1);
const_assert_eq!(Pass::BINNED.len(), Pass::COUNT - 1);

/// What executing a command does. The scheduler only cares that clear-type
/// commands bucket into [`Pass::Opaque`] and never widen the depth extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// A regular draw call.
    Draw,
    /// A depth-buffer clear issued by a producer.
    ClearDepth,
}

/// Identifies the producer that owns a command, for debug filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

/// Index of a command within the frame's [`CommandBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandId(u32);

impl CommandId {
    /// Position in the command buffer.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One unit of rendering work submitted by a producer for this frame.
///
/// The scheduler reads the bounding/pass metadata and decides when and
/// where the command executes; it never touches the rendering content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Pass this command executes in.
    pub pass: Pass,
    /// Draw or clear semantics.
    pub kind: CommandKind,
    /// World-space bounds, if the producer can supply them. Commands
    /// without bounds span the whole camera depth range.
    pub bounding_volume: Option<BoundingSphere>,
    /// Whether visibility culling applies.
    pub cull: bool,
    /// Insert into only the nearest overlapping slice instead of all of them.
    pub execute_in_closest_frustum: bool,
    /// Producer that owns this command.
    pub owner: Option<OwnerId>,
}

impl DrawCommand {
    /// A draw command with culling enabled and no bounds.
    pub fn new(pass: Pass) -> Self {
        Self {
            pass,
            kind: CommandKind::Draw,
            bounding_volume: None,
            cull: true,
            execute_in_closest_frustum: false,
            owner: None,
        }
    }

    /// A depth-clear command. Clears carry no bounds and are never culled.
    pub fn clear_depth() -> Self {
        Self {
            pass: Pass::Opaque,
            kind: CommandKind::ClearDepth,
            bounding_volume: None,
            cull: false,
            execute_in_closest_frustum: false,
            owner: None,
        }
    }

    /// Set the bounding volume.
    pub fn with_bounding_volume(mut self, volume: BoundingSphere) -> Self {
        self.bounding_volume = Some(volume);
        self
    }

    /// Disable visibility culling for this command.
    pub fn unculled(mut self) -> Self {
        self.cull = false;
        self
    }

    /// Restrict execution to the nearest overlapping slice.
    pub fn in_closest_frustum(mut self) -> Self {
        self.execute_in_closest_frustum = true;
        self
    }

    /// Tag the command with its producer.
    pub fn owned_by(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Flat, append-only sequence of draw commands for one frame.
///
/// Producers push commands in submission order; the buffer is cleared and
/// refilled every frame, retaining its allocation.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command, returning its id for this frame.
    pub fn push(&mut self, command: DrawCommand) -> CommandId {
        let id = CommandId(self.commands.len() as u32);
        self.commands.push(command);
        id
    }

    /// Drop all commands, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of commands submitted this frame.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands have been submitted.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate commands with their ids, in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (CommandId, &DrawCommand)> {
        self.commands
            .iter()
            .enumerate()
            .map(|(i, c)| (CommandId(i as u32), c))
    }
}

impl std::ops::Index<CommandId> for CommandBuffer {
    type Output = DrawCommand;

    fn index(&self, id: CommandId) -> &DrawCommand {
        &self.commands[id.index()]
    }
}
