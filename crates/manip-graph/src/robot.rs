// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal kinematic tree: just enough to place frames for pose constraints.
//!
//! Model loading (URDF/SRDF) happens elsewhere; callers assemble a [`Device`]
//! joint by joint, or compose several into a composite robot.
use manip_math::{Pose, Quat, Vec3};

use crate::error::{GraphError, Result};

/// Motion of a joint about or along its axis (expressed in the joint frame).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Rotation of `q` radians about `axis`.
    Revolute {
        /// Rotation axis.
        axis: Vec3,
    },
    /// Translation of `q` metres along `axis`.
    Prismatic {
        /// Translation axis.
        axis: Vec3,
    },
    /// Rigid attachment; consumes no configuration entry.
    Fixed,
}

/// One joint of a [`Device`].
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    parent: Option<usize>,
    placement: Pose,
    kind: JointKind,
    rank: Option<usize>,
}

impl Joint {
    /// Joint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the parent joint, `None` for a root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Joint kind.
    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// Configuration rank, `None` for fixed joints.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    fn motion(&self, q: &[f64]) -> Pose {
        let value = self.rank.and_then(|r| q.get(r)).copied().unwrap_or(0.0);
        match self.kind {
            JointKind::Revolute { axis } => Pose::from_rotation(Quat::from_axis_angle(axis, value)),
            JointKind::Prismatic { axis } => {
                Pose::from_translation(axis.normalize().scale(value))
            }
            JointKind::Fixed => Pose::identity(),
        }
    }
}

/// A named frame rigidly attached to a joint: a gripper or a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedFrame {
    name: String,
    joint: Option<usize>,
    local: Pose,
}

impl AttachedFrame {
    /// Frame name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joint the frame hangs from (`None` = world).
    pub fn joint(&self) -> Option<usize> {
        self.joint
    }

    /// Placement in the joint frame.
    pub fn local(&self) -> Pose {
        self.local
    }
}

/// A robot (or a composite of robots and objects) as a kinematic tree.
///
/// Joints are stored parents-first, so forward kinematics is a single pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Device {
    name: String,
    joints: Vec<Joint>,
    grippers: Vec<AttachedFrame>,
    handles: Vec<AttachedFrame>,
    config_size: usize,
}

impl Device {
    /// An empty device.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of configuration entries.
    pub fn config_size(&self) -> usize {
        self.config_size
    }

    /// Joints in parents-first order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Adds a joint under `parent` (`None` = world) and returns its index.
    pub fn add_joint(
        &mut self,
        name: &str,
        parent: Option<&str>,
        placement: Pose,
        kind: JointKind,
    ) -> Result<usize> {
        if self.joint_index(name).is_some() {
            return Err(GraphError::InvalidArgument(format!(
                "joint `{name}` already exists in `{}`",
                self.name
            )));
        }
        let parent = parent.map(|p| self.require_joint(p)).transpose()?;
        let rank = match kind {
            JointKind::Fixed => None,
            JointKind::Revolute { .. } | JointKind::Prismatic { .. } => {
                self.config_size += 1;
                Some(self.config_size - 1)
            }
        };
        self.joints.push(Joint {
            name: name.to_owned(),
            parent,
            placement,
            kind,
            rank,
        });
        Ok(self.joints.len() - 1)
    }

    /// Attaches a gripper frame to `joint`.
    pub fn add_gripper(&mut self, name: &str, joint: &str, local: Pose) -> Result<()> {
        let joint = Some(self.require_joint(joint)?);
        self.grippers.push(AttachedFrame {
            name: name.to_owned(),
            joint,
            local,
        });
        Ok(())
    }

    /// Attaches a handle frame to `joint`.
    pub fn add_handle(&mut self, name: &str, joint: &str, local: Pose) -> Result<()> {
        let joint = Some(self.require_joint(joint)?);
        self.handles.push(AttachedFrame {
            name: name.to_owned(),
            joint,
            local,
        });
        Ok(())
    }

    /// Index of the joint called `name`.
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Configuration rank of the joint called `name`.
    pub fn joint_rank(&self, name: &str) -> Option<usize> {
        self.joint_index(name).and_then(|i| self.joints[i].rank)
    }

    /// Gripper called `name`.
    pub fn gripper(&self, name: &str) -> Option<&AttachedFrame> {
        self.grippers.iter().find(|g| g.name == name)
    }

    /// Handle called `name`.
    pub fn handle(&self, name: &str) -> Option<&AttachedFrame> {
        self.handles.iter().find(|h| h.name == name)
    }

    /// World pose of every joint frame at configuration `q`.
    ///
    /// Missing configuration entries read as zero.
    pub fn joint_poses(&self, q: &[f64]) -> Vec<Pose> {
        let mut poses: Vec<Pose> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let parent = joint
                .parent
                .and_then(|p| poses.get(p))
                .copied()
                .unwrap_or_else(Pose::identity);
            poses.push(parent.compose(&joint.placement).compose(&joint.motion(q)));
        }
        poses
    }

    /// World pose of `local` on `joint` (`None` = world) at `q`.
    pub fn frame_pose(&self, q: &[f64], joint: Option<usize>, local: &Pose) -> Pose {
        let base = joint
            .and_then(|j| self.joint_poses(q).get(j).copied())
            .unwrap_or_else(Pose::identity);
        base.compose(local)
    }

    /// Concatenates devices into one composite robot.
    ///
    /// Joint, gripper and handle names are prefixed with `<part>/`; the
    /// configuration is the parts' configurations in order.
    pub fn composite(name: impl Into<String>, parts: &[Self]) -> Self {
        let mut robot = Self::new(name);
        for part in parts {
            let joint_offset = robot.joints.len();
            let rank_offset = robot.config_size;
            let prefixed = |n: &str| format!("{}/{}", part.name, n);
            robot.joints.extend(part.joints.iter().map(|j| Joint {
                name: prefixed(&j.name),
                parent: j.parent.map(|p| p + joint_offset),
                placement: j.placement,
                kind: j.kind,
                rank: j.rank.map(|r| r + rank_offset),
            }));
            let shift = |f: &AttachedFrame| AttachedFrame {
                name: prefixed(&f.name),
                joint: f.joint.map(|j| j + joint_offset),
                local: f.local,
            };
            robot.grippers.extend(part.grippers.iter().map(shift));
            robot.handles.extend(part.handles.iter().map(shift));
            robot.config_size += part.config_size;
        }
        robot
    }

    fn require_joint(&self, name: &str) -> Result<usize> {
        self.joint_index(name).ok_or_else(|| {
            GraphError::NotFound(format!("joint `{name}` does not exist in `{}`", self.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn arm() -> Device {
        let mut d = Device::new("arm");
        d.add_joint("slide", None, Pose::identity(), JointKind::Prismatic { axis: Vec3::UNIT_X })
            .expect("slide");
        d.add_joint(
            "wrist",
            Some("slide"),
            Pose::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            JointKind::Revolute { axis: Vec3::UNIT_Z },
        )
        .expect("wrist");
        d.add_gripper("tool", "wrist", Pose::from_translation(Vec3::UNIT_X))
            .expect("tool");
        d
    }

    #[test]
    fn forward_kinematics_chains_parent_poses() {
        let d = arm();
        let poses = d.joint_poses(&[2.0, FRAC_PI_2]);
        let tool = d.gripper("tool").expect("tool");
        let p = poses[1].compose(&tool.local()).translation();
        approx::assert_abs_diff_eq!(p.x(), 2.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(p.y(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn composite_prefixes_names_and_offsets_ranks() {
        let mut box_ = Device::new("box");
        box_.add_joint("x", None, Pose::identity(), JointKind::Prismatic { axis: Vec3::UNIT_X })
            .expect("x");
        let robot = Device::composite("scene", &[arm(), box_]);
        assert_eq!(robot.config_size(), 3);
        assert_eq!(robot.joint_rank("box/x"), Some(2));
        assert!(robot.gripper("arm/tool").is_some());
        assert_eq!(robot.joints()[1].parent(), Some(0));
    }

    #[test]
    fn duplicate_and_orphan_joints_are_rejected() {
        let mut d = arm();
        assert!(matches!(
            d.add_joint("slide", None, Pose::identity(), JointKind::Fixed),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            d.add_joint("x", Some("nope"), Pose::identity(), JointKind::Fixed),
            Err(GraphError::NotFound(_))
        ));
    }
}
