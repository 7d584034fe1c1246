//! 本地连接：把 `MemoryModel` 包装成可“断线”的服务，模拟进程外引擎。
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use wp_core::{
    error::ServiceError,
    service::{Connector, LanguageModelService, LookupEntry, ModelClass, PredictOptions},
    tokenizer::Tokenized,
};

use crate::memory::MemoryModel;

/// 引擎连接器；克隆出来的句柄共享同一个引擎和同一个在线开关。
#[derive(Debug, Clone)]
pub struct LocalConnector {
    model: Rc<RefCell<MemoryModel>>,
    online: Rc<Cell<bool>>,
}

impl LocalConnector {
    pub fn new(model: MemoryModel) -> Self {
        Self {
            model: Rc::new(RefCell::new(model)),
            online: Rc::new(Cell::new(true)),
        }
    }

    pub fn model(&self) -> Rc<RefCell<MemoryModel>> {
        self.model.clone()
    }

    /// 关掉后新连接失败，已有连接的调用返回断线。
    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    pub fn is_online(&self) -> bool {
        self.online.get()
    }
}

impl Connector for LocalConnector {
    type Connection = SharedModel;

    fn connect(&mut self) -> Result<SharedModel, ServiceError> {
        if !self.online.get() {
            return Err(ServiceError::Connect("语言模型引擎未运行".to_string()));
        }
        tracing::debug!("连接语言模型引擎");
        Ok(SharedModel {
            model: self.model.clone(),
            online: self.online.clone(),
        })
    }
}

/// 一个到 `MemoryModel` 的连接。
#[derive(Debug)]
pub struct SharedModel {
    model: Rc<RefCell<MemoryModel>>,
    online: Rc<Cell<bool>>,
}

impl SharedModel {
    fn check(&self) -> Result<(), ServiceError> {
        if self.online.get() {
            Ok(())
        } else {
            Err(ServiceError::Disconnected("语言模型引擎已退出".to_string()))
        }
    }
}

impl LanguageModelService for SharedModel {
    fn predict(
        &mut self,
        models: &[String],
        context: &str,
        options: PredictOptions,
    ) -> Result<Vec<String>, ServiceError> {
        self.check()?;
        self.model.borrow_mut().predict(models, context, options)
    }

    fn learn_text(
        &mut self,
        models: &[String],
        text: &str,
        allow_new_words: bool,
    ) -> Result<(), ServiceError> {
        self.check()?;
        self.model
            .borrow_mut()
            .learn_text(models, text, allow_new_words)
    }

    fn tokenize_text(&mut self, text: &str) -> Result<Tokenized, ServiceError> {
        self.check()?;
        self.model.borrow_mut().tokenize_text(text)
    }

    fn tokenize_context(&mut self, text: &str) -> Result<Vec<String>, ServiceError> {
        self.check()?;
        self.model.borrow_mut().tokenize_context(text)
    }

    fn lookup_text(
        &mut self,
        models: &[String],
        text: &str,
    ) -> Result<Vec<LookupEntry>, ServiceError> {
        self.check()?;
        self.model.borrow_mut().lookup_text(models, text)
    }

    fn model_names(&mut self, class: ModelClass) -> Result<Vec<String>, ServiceError> {
        self.check()?;
        self.model.borrow_mut().model_names(class)
    }
}
