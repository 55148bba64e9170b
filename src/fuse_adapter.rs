//! Translates `fuse3::path::PathFilesystem` callbacks into calls against
//! the `fs` module, and its `NodeAttr`/`SwiftFsError` results back into
//! `fuse3::FileAttr`/`Errno`. Grounded in the tummycrypt FUSE driver's
//! path-based `PathFilesystem` shape (a stubbed `StorageClient`, rather
//! than OpenDAL, backs the equivalent of its `Operator`).

use std::ffi::OsStr;
use std::num::NonZeroU32;
use std::time::{Duration, SystemTime};

use fuse3::path::prelude::*;
use fuse3::{Errno, FileType};
use futures::stream;

use crate::error::SwiftFsError;
use crate::fs::open::OpenFlags;
use crate::fs::{self, FsContext};
use crate::node::NodeAttr;

const ATTR_TTL: Duration = Duration::from_secs(1);

pub struct SwiftFuse {
    ctx: FsContext,
}

impl SwiftFuse {
    pub fn new(ctx: FsContext) -> Self {
        SwiftFuse { ctx }
    }
}

fn to_errno(err: SwiftFsError) -> Errno {
    Errno::from(libc::c_int::from(err))
}

fn path_str(path: Option<&OsStr>) -> fuse3::Result<String> {
    path.and_then(|p| p.to_str()).map(str::to_string).ok_or_else(|| Errno::from(libc::EINVAL))
}

fn unix_seconds(t: SystemTime) -> f64 {
    t.duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

fn time_or_now_seconds(t: TimeOrNow) -> f64 {
    match t {
        TimeOrNow::SpecificTime(t) => unix_seconds(t),
        TimeOrNow::Now => unix_seconds(SystemTime::now()),
    }
}

fn to_file_attr(attr: NodeAttr, mount_time: SystemTime) -> FileAttr {
    let kind = if attr.is_dir {
        FileType::Directory
    } else if attr.is_symlink {
        FileType::Symlink
    } else {
        FileType::RegularFile
    };
    FileAttr {
        size: attr.size,
        blocks: attr.size.div_ceil(512),
        atime: mount_time,
        mtime: mount_time,
        ctime: mount_time,
        #[cfg(target_os = "macos")]
        crtime: mount_time,
        kind,
        perm: (attr.mode & 0o7777) as u16,
        nlink: if attr.is_dir { 2 } else { 1 },
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: 4096,
        #[cfg(target_os = "macos")]
        flags: 0,
    }
}

impl PathFilesystem for SwiftFuse {
    async fn init(&self, _req: Request) -> fuse3::Result<ReplyInit> {
        Ok(ReplyInit {
            max_write: NonZeroU32::new(128 * 1024).unwrap(),
        })
    }

    async fn destroy(&self, _req: Request) {}

    async fn getattr(
        &self,
        _req: Request,
        path: Option<&OsStr>,
        _fh: Option<u64>,
        _flags: u32,
    ) -> fuse3::Result<ReplyAttr> {
        let path = path_str(path)?;
        let (_container, node) = fs::resolve(&self.ctx, &path).await.map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyAttr {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    async fn lookup(&self, _req: Request, parent: &OsStr, name: &OsStr) -> fuse3::Result<ReplyEntry> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let full = if parent == "/" {
            format!("/{name}")
        } else {
            format!("{parent}/{name}")
        };
        let (_container, node) = fs::resolve(&self.ctx, &full).await.map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    type DirEntryStream<'a>
        = stream::Iter<std::vec::IntoIter<fuse3::Result<DirectoryEntry>>>
    where
        Self: 'a;
    type DirEntryPlusStream<'a>
        = stream::Iter<std::vec::IntoIter<fuse3::Result<DirectoryEntryPlus>>>
    where
        Self: 'a;

    async fn opendir(&self, _req: Request, _path: &OsStr, _flags: u32) -> fuse3::Result<ReplyOpen> {
        Ok(ReplyOpen { fh: 0, flags: 0 })
    }

    async fn readdir<'a>(
        &'a self,
        _req: Request,
        path: &'a OsStr,
        _fh: u64,
        offset: i64,
    ) -> fuse3::Result<ReplyDirectory<Self::DirEntryStream<'a>>> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        let children = fs::readdir::readdir(&self.ctx, &container, &dir).await.map_err(to_errno)?;

        let mut entries = Vec::new();
        if offset == 0 {
            entries.push(Ok(DirectoryEntry {
                kind: FileType::Directory,
                name: ".".into(),
                offset: 1,
            }));
        }
        if offset <= 1 {
            entries.push(Ok(DirectoryEntry {
                kind: FileType::Directory,
                name: "..".into(),
                offset: 2,
            }));
        }
        let mut next_offset = 3i64;
        for child in children {
            if next_offset > offset {
                let kind = if child.is_directory_like() {
                    FileType::Directory
                } else if child.is_symlink() {
                    FileType::Symlink
                } else {
                    FileType::RegularFile
                };
                entries.push(Ok(DirectoryEntry {
                    kind,
                    name: child.name.clone().into(),
                    offset: next_offset,
                }));
            }
            next_offset += 1;
        }

        Ok(ReplyDirectory {
            entries: stream::iter(entries),
        })
    }

    async fn open(&self, _req: Request, path: &OsStr, flags: u32) -> fuse3::Result<ReplyOpen> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        let open_flags = if flags as i32 & libc::O_ACCMODE == libc::O_RDONLY {
            OpenFlags::Read
        } else if flags as i32 & libc::O_ACCMODE == libc::O_WRONLY {
            OpenFlags::Write
        } else {
            OpenFlags::ReadWrite
        };
        let handle = fs::open::open(&self.ctx, &container, &node, open_flags).await.map_err(to_errno)?;
        Ok(ReplyOpen { fh: handle.id, flags })
    }

    async fn create(
        &self,
        _req: Request,
        parent: &OsStr,
        name: &OsStr,
        _mode: u32,
        _flags: u32,
    ) -> fuse3::Result<ReplyCreated> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        let node = fs::create::create(&self.ctx, &container, &dir, name).await.map_err(to_errno)?;
        let handle = fs::open::open(&self.ctx, &container, &node, OpenFlags::Write).await.map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyCreated {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
            generation: 0,
            fh: handle.id,
            flags: 0,
        })
    }

    async fn mkdir(
        &self,
        _req: Request,
        parent: &OsStr,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
    ) -> fuse3::Result<ReplyEntry> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        let node = fs::mk_dir::mkdir(&self.ctx, &container, &dir, name).await.map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    async fn unlink(&self, _req: Request, parent: &OsStr, name: &OsStr) -> fuse3::Result<()> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        fs::remove::unlink(&self.ctx, &container, &dir, name).await.map_err(to_errno)
    }

    async fn rmdir(&self, _req: Request, parent: &OsStr, name: &OsStr) -> fuse3::Result<()> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        fs::rm_dir::rmdir(&self.ctx, &container, &dir, name).await.map_err(to_errno)
    }

    async fn rename(
        &self,
        _req: Request,
        origin_parent: &OsStr,
        origin_name: &OsStr,
        parent: &OsStr,
        name: &OsStr,
    ) -> fuse3::Result<()> {
        let origin_parent = origin_parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let origin_name = origin_name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (src_container, src_dir) = fs::resolve(&self.ctx, origin_parent).await.map_err(to_errno)?;
        let (dst_container, dst_dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        fs::rename::rename(&self.ctx, &src_container, &src_dir, origin_name, &dst_container, &dst_dir, name)
            .await
            .map_err(to_errno)
    }

    async fn symlink(
        &self,
        _req: Request,
        parent: &OsStr,
        name: &OsStr,
        link: &OsStr,
    ) -> fuse3::Result<ReplyEntry> {
        let parent = parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let target = link.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, dir) = fs::resolve(&self.ctx, parent).await.map_err(to_errno)?;
        let node = fs::symlink::symlink(&self.ctx, &container, &dir, name, target).await.map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    async fn readlink(&self, _req: Request, path: &OsStr) -> fuse3::Result<ReplyData> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (_container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        match node.kind() {
            crate::node::NodeKind::Symlink { target } => Ok(ReplyData {
                data: bytes::Bytes::from(target.into_bytes()),
            }),
            _ => Err(Errno::from(libc::EINVAL)),
        }
    }

    async fn link(
        &self,
        _req: Request,
        path: &OsStr,
        new_parent: &OsStr,
        new_name: &OsStr,
    ) -> fuse3::Result<ReplyEntry> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let new_parent = new_parent.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let new_name = new_name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let slash = path.rfind('/').ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (src_parent_path, src_name) = (&path[..slash.max(1)], &path[slash + 1..]);
        let (src_container, src_dir) = fs::resolve(&self.ctx, src_parent_path).await.map_err(to_errno)?;
        let (dst_container, dst_dir) = fs::resolve(&self.ctx, new_parent).await.map_err(to_errno)?;
        let node = fs::link::link(&self.ctx, &src_container, &src_dir, src_name, &dst_container, &dst_dir, new_name)
            .await
            .map_err(to_errno)?;
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyEntry {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    async fn read(
        &self,
        _req: Request,
        _path: Option<&OsStr>,
        fh: u64,
        offset: u64,
        size: u32,
    ) -> fuse3::Result<ReplyData> {
        let handle = self.ctx.handles.get(fh).ok_or_else(|| Errno::from(libc::EBADF))?;
        let data = fs::read::read(&self.ctx.pool, &handle, offset, size).await.map_err(to_errno)?;
        Ok(ReplyData { data })
    }

    async fn write(
        &self,
        _req: Request,
        _path: Option<&OsStr>,
        fh: u64,
        _offset: u64,
        data: &[u8],
        _write_flags: u32,
        _flags: u32,
    ) -> fuse3::Result<ReplyWrite> {
        let handle = self.ctx.handles.get(fh).ok_or_else(|| Errno::from(libc::EBADF))?;
        let written = fs::write::write(&self.ctx, &handle, data).await.map_err(to_errno)?;
        Ok(ReplyWrite { written })
    }

    async fn release(
        &self,
        _req: Request,
        _path: Option<&OsStr>,
        fh: u64,
        _flags: u32,
        _lock_owner: u64,
        _flush: bool,
    ) -> fuse3::Result<()> {
        fs::release::release(&self.ctx, fh).await.map_err(to_errno)
    }

    async fn setattr(
        &self,
        _req: Request,
        path: Option<&OsStr>,
        _fh: Option<u64>,
        set_attr: SetAttr,
    ) -> fuse3::Result<ReplyAttr> {
        let path = path_str(path)?;
        let (container, node) = fs::resolve(&self.ctx, &path).await.map_err(to_errno)?;
        if let Some(size) = set_attr.size {
            fs::set_attr::setattr_size(&self.ctx, &container, &node, size).await.map_err(to_errno)?;
        }
        if let Some(mtime) = set_attr.mtime {
            let mtime = time_or_now_seconds(mtime);
            fs::set_attr::setattr_mtime(&self.ctx, &container, &node, mtime).await.map_err(to_errno)?;
        }
        let attr = fs::get_attr::getattr(&self.ctx, &node);
        Ok(ReplyAttr {
            ttl: ATTR_TTL,
            attr: to_file_attr(attr, self.mount_system_time()),
        })
    }

    async fn statfs(&self, _req: Request, _path: &OsStr) -> fuse3::Result<ReplyStatFs> {
        let stat = fs::statfs(&self.ctx).await.map_err(to_errno)?;
        Ok(ReplyStatFs {
            blocks: stat.blocks,
            bfree: stat.bfree,
            bavail: stat.bavail,
            files: stat.files,
            ffree: u64::MAX,
            bsize: stat.bsize as u32,
            namelen: 255,
            frsize: stat.bsize as u32,
        })
    }

    async fn setxattr(
        &self,
        _req: Request,
        path: &OsStr,
        name: &OsStr,
        value: &[u8],
        _flags: u32,
        _position: u32,
    ) -> fuse3::Result<()> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        fs::xattr::set_xattr(&self.ctx, &container, &node, name, value).await.map_err(to_errno)
    }

    async fn getxattr(&self, _req: Request, path: &OsStr, name: &OsStr, size: u32) -> fuse3::Result<ReplyXAttr> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (_container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        let value = fs::xattr::get_xattr(&node, name).ok_or_else(|| Errno::from(libc::ENODATA))?;
        if size == 0 {
            return Ok(ReplyXAttr::Size(value.len() as u32));
        }
        Ok(ReplyXAttr::Data(bytes::Bytes::from(value.into_bytes())))
    }

    async fn listxattr(&self, _req: Request, path: &OsStr, size: u32) -> fuse3::Result<ReplyXAttr> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (_container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        let names = fs::xattr::list_xattr(&node);
        let joined: Vec<u8> = names.into_iter().flat_map(|n| n.into_bytes().into_iter().chain(std::iter::once(0u8))).collect();
        if size == 0 {
            return Ok(ReplyXAttr::Size(joined.len() as u32));
        }
        Ok(ReplyXAttr::Data(bytes::Bytes::from(joined)))
    }

    async fn removexattr(&self, _req: Request, path: &OsStr, name: &OsStr) -> fuse3::Result<()> {
        let path = path.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let name = name.to_str().ok_or_else(|| Errno::from(libc::EINVAL))?;
        let (container, node) = fs::resolve(&self.ctx, path).await.map_err(to_errno)?;
        fs::xattr::remove_xattr(&self.ctx, &container, &node, name).await.map_err(to_errno)
    }
}

impl SwiftFuse {
    fn mount_system_time(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs_f64(self.ctx.mount_time)
    }
}
