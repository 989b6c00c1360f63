#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    Symlink,
    /// Submodule commit recorded in a tree or the index
    Gitlink,
    #[default]
    Directory,
}

impl EntryMode {
    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Whether the entry has content living in the working tree of this repository
    pub fn is_blob(&self) -> bool {
        matches!(self, EntryMode::File(_) | EntryMode::Symlink)
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        let mode = u32::from_str_radix(mode, 8)
            .map_err(|_| anyhow::anyhow!("Invalid entry mode {mode:?}"))?;

        Self::try_from(mode)
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    // only the object type bits and the owner execute bit matter, old
    // repositories carry modes such as 100664
    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode & 0o170000 {
            0o100000 if mode & 0o100 != 0 => Ok(EntryMode::File(FileMode::Executable)),
            0o100000 => Ok(EntryMode::File(FileMode::Regular)),
            0o120000 => Ok(EntryMode::Symlink),
            0o160000 => Ok(EntryMode::Gitlink),
            0o040000 => Ok(EntryMode::Directory),
            _ => Err(anyhow::anyhow!("Invalid entry mode {mode:o}")),
        }
    }
}
