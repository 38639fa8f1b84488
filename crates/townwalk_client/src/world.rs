use townwalk_shared::block::{Block, BlockId};

/// Placed blocks in insertion order. Several blocks may share a cell.
#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Removes the block with `id`, keeping the order of the rest. Returns
    /// `None` when no such block is stored.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.blocks.iter().position(|block| block.id == id)?;
        Some(self.blocks.remove(index))
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
